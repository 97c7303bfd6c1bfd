use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use satyam::error::ErrorCode;
use satyam::i18n::Language;
use satyam::llm::types::AiBoundary;
use satyam::llm::{GeminiClient, LlmConfig, LlmError};
use satyam::model::{AnalysisMode, Verdict};
use satyam::services::InterruptRouter;
use satyam::services::capture::{CaptureError, FileDevices, load_media};
use satyam::services::conversation::{ConversationMessage, MessageKind, Role, SendOutcome};
use satyam::services::playback::{PlaybackController, PlaybackError, ToggleOutcome, WavFileOutput};
use satyam::services::share::{ShareError, whatsapp_link};
use satyam::state::{AppShell, ShellError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error("terminal io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("speech unavailable")]
    SpeechUnavailable,
}

#[derive(Parser, Debug)]
#[command(name = "satyam", about = "Check forwards, calls, and screenshots for misinformation and scams")]
struct Cli {
    /// Answer and UI language: en, hi, ta, gu.
    #[arg(long, global = true, env = "SATYAM_LANGUAGE", default_value = "hi")]
    lang: Language,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fact-check a message.
    Check {
        text: String,
        #[arg(long, default_value = "news", value_parser = parse_mode)]
        mode: AnalysisMode,
        /// Also read the explanation aloud into this WAV file.
        #[arg(long)]
        listen: Option<PathBuf>,
    },
    /// Check an image, video, or audio file.
    CheckFile {
        path: PathBuf,
        #[arg(long, default_value = "news", value_parser = parse_mode)]
        mode: AnalysisMode,
        /// Also read the explanation aloud into this WAV file.
        #[arg(long)]
        listen: Option<PathBuf>,
    },
    /// Read text aloud into a WAV file.
    Speak {
        text: String,
        #[arg(long, default_value = "satyam.wav")]
        out: PathBuf,
    },
    /// Talk to the safety assistant.
    Chat {
        /// Screenshot to scan before the first question.
        #[arg(long)]
        scan: Option<PathBuf>,
    },
    /// Check configuration and connectivity.
    Doctor,
}

fn parse_mode(s: &str) -> Result<AnalysisMode, String> {
    match s {
        "news" => Ok(AnalysisMode::News),
        "call" => Ok(AnalysisMode::Call),
        other => Err(format!("unknown mode `{other}` (expected news or call)")),
    }
}

/// One Ctrl-C watcher for the whole run, feeding an [`InterruptRouter`].
struct Interrupt {
    router: Arc<InterruptRouter>,
    watcher: tokio::task::JoinHandle<()>,
}

impl Interrupt {
    fn new() -> Self {
        let router = Arc::new(InterruptRouter::default());
        let target = Arc::clone(&router);
        let watcher = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                target.trip();
            }
        });
        Self { router, watcher }
    }

    fn arm(&self) -> CancellationToken {
        self.router.arm()
    }
}

impl Drop for Interrupt {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Doctor => run_doctor().await,
        command => {
            let client = GeminiClient::from_env()?;
            info!(
                model = client.model(),
                speech_model = client.speech_model(),
                lang = %cli.lang,
                "satyam: client ready"
            );
            let boundary: Arc<dyn AiBoundary> = Arc::new(client);
            run(command, boundary, cli.lang).await
        }
    }
}

async fn run(command: Command, boundary: Arc<dyn AiBoundary>, lang: Language) -> Result<(), CliError> {
    match command {
        Command::Check { text, mode, listen } => {
            let mut shell = AppShell::new(boundary, lang);
            shell.set_input(text);
            eprintln!("{}", shell.strings().analyzing);
            let interrupt = Interrupt::new();
            let outcome = shell.check_text(mode, &interrupt.arm()).await;
            finish_check(&mut shell, outcome.map(|_| ()), listen.as_deref()).await
        }
        Command::CheckFile { path, mode, listen } => {
            let media = load_media(&path).await?;
            let mut shell = AppShell::new(boundary, lang);
            eprintln!("{}", shell.strings().analyzing);
            let interrupt = Interrupt::new();
            let outcome = shell.check_media(media, mode, &interrupt.arm()).await;
            finish_check(&mut shell, outcome.map(|_| ()), listen.as_deref()).await
        }
        Command::Speak { text, out } => run_speak(boundary.as_ref(), &text, out, lang).await,
        Command::Chat { scan } => run_chat(boundary, lang, scan).await,
        Command::Doctor => run_doctor().await,
    }
}

async fn finish_check(
    shell: &mut AppShell,
    outcome: Result<(), ShellError>,
    listen: Option<&Path>,
) -> Result<(), CliError> {
    if let Some(alert) = shell.take_alert() {
        eprintln!("{alert}");
    }
    outcome?;
    let Some(result) = shell.result() else {
        return Ok(());
    };
    if let Some(report) = shell.report() {
        println!("{report}");
    }
    let s = shell.strings();
    if result.verdict != Verdict::Real {
        println!("{}", s.emergency);
    }
    println!("{}: {}", s.share_alert, whatsapp_link(result, s)?);

    if let Some(path) = listen {
        let mut player = PlaybackController::new(WavFileOutput::new(path));
        let label = shell.listen_label(&player);
        match shell.listen(&mut player).await {
            Some(ToggleOutcome::Started) => println!("🔊 {label}: {}", path.display()),
            _ => {
                if let Some(alert) = shell.take_alert() {
                    eprintln!("{alert}");
                }
            }
        }
    }
    Ok(())
}

async fn run_speak(boundary: &dyn AiBoundary, text: &str, out: PathBuf, lang: Language) -> Result<(), CliError> {
    let mut player = PlaybackController::new(WavFileOutput::new(&out));
    match player.toggle(boundary, text, lang).await {
        ToggleOutcome::Started => {
            println!("{}", out.display());
            Ok(())
        }
        ToggleOutcome::Stopped | ToggleOutcome::Unavailable => {
            eprintln!("{}", satyam::i18n::strings(lang).playback_unavailable);
            Err(CliError::SpeechUnavailable)
        }
    }
}

async fn run_doctor() -> Result<(), CliError> {
    let config = LlmConfig::from_env()?;
    println!("base url:     {}", config.base_url);
    println!("model:        {}", config.model);
    println!("speech model: {}", config.speech_model);
    println!(
        "timeouts:     request {}s, connect {}s",
        config.timeouts.request_secs, config.timeouts.connect_secs
    );

    let client = GeminiClient::new(config)?;
    match client.test_connection().await {
        Ok(()) => {
            println!("connection:   ok");
            Ok(())
        }
        Err(e) => {
            println!("connection:   failed ({})", e.error_code());
            Err(e.into())
        }
    }
}

// =============================================================================
// CHAT
// =============================================================================

fn print_message(message: &ConversationMessage) {
    let who = match message.role {
        Role::User => "you",
        Role::Model => "sahayak",
    };
    println!("{who}> {message}");
    if message.role == Role::Model && message.kind == MessageKind::Plain {
        for link in message.inline_links() {
            println!("  [🔗 {}] {}", link.title, link.uri);
        }
    }
    println!();
}

fn print_languages(current: Language) {
    for language in Language::ALL {
        let marker = if language == current { '*' } else { ' ' };
        println!("{marker} {}  {}", language.code(), language.native_label());
    }
}

/// Print transcript entries added since `printed`, returning the new count.
fn print_new(shell: &AppShell, printed: usize) -> usize {
    let messages = shell.conversation().messages();
    let start = printed.min(messages.len());
    for message in &messages[start..] {
        print_message(message);
    }
    messages.len()
}

async fn run_chat(boundary: Arc<dyn AiBoundary>, lang: Language, scan: Option<PathBuf>) -> Result<(), CliError> {
    let mut shell = AppShell::new(boundary, lang);
    let interrupt = Interrupt::new();
    let s = shell.strings();
    println!("{} · {}\n", s.title, s.subtitle);
    let mut printed = print_new(&shell, 0);

    if let Some(path) = scan {
        let devices = FileDevices { screenshot: Some(path), voice: None };
        let outcome = shell_scan(&mut shell, &devices, &interrupt.arm()).await;
        report_shell_error(&mut shell, outcome);
        printed = print_new(&shell, printed);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        // Ctrl-C at an idle prompt ends the chat.
        let idle = interrupt.arm();
        print!("> ");
        std::io::stdout().flush()?;
        let line = tokio::select! {
            line = lines.next_line() => line?,
            () = idle.cancelled() => None,
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        let (command, arg) = line.split_once(' ').map_or((line, ""), |(c, a)| (c, a.trim()));

        let cancel = interrupt.arm();
        match command {
            "/quit" | "/exit" => break,
            "/lang" if arg.is_empty() => {
                print_languages(shell.language());
                continue;
            }
            "/lang" => match arg.parse::<Language>() {
                Ok(language) => {
                    shell.set_language(language);
                    printed = print_new(&shell, 0);
                    continue;
                }
                Err(e) => eprintln!("{e}"),
            },
            "/scan" => {
                let devices = FileDevices { screenshot: Some(PathBuf::from(arg)), voice: None };
                eprintln!("{}", shell.strings().analyzing);
                let outcome = shell_scan(&mut shell, &devices, &cancel).await;
                report_shell_error(&mut shell, outcome);
            }
            "/voice" => {
                let devices = FileDevices { screenshot: None, voice: Some(PathBuf::from(arg)) };
                let stop = CancellationToken::new();
                stop.cancel();
                match shell.voice_question(&devices, &stop, &cancel).await {
                    Ok(SendOutcome::Skipped) => eprintln!("(no speech detected)"),
                    Ok(_) => {}
                    Err(e) => report_shell_error(&mut shell, Err(e)),
                }
            }
            _ => {
                if shell.ask(line, &cancel).await == SendOutcome::Cancelled {
                    eprintln!("(cancelled)");
                }
            }
        }
        printed = print_new(&shell, printed);
    }
    Ok(())
}

async fn shell_scan(
    shell: &mut AppShell,
    devices: &FileDevices,
    cancel: &CancellationToken,
) -> Result<(), ShellError> {
    shell.screen_scan(devices, cancel).await.map(|_| ())
}

fn report_shell_error(shell: &mut AppShell, outcome: Result<(), ShellError>) {
    if let Some(alert) = shell.take_alert() {
        eprintln!("{alert}");
    }
    if let Err(e) = outcome {
        info!(error = %e, code = e.error_code(), "satyam: action failed");
    }
}
