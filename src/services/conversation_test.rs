use super::*;
use crate::llm::test_helpers::{MockBoundary, sample_frame, sample_result};
use crate::llm::types::{ChatReply, LlmError};
use crate::model::{Source, Verdict};

fn manager(mock: &MockBoundary, language: Language) -> ConversationManager {
    ConversationManager::new(Arc::new(mock.clone()), language)
}

fn scan() -> ScanContext {
    ScanContext { image: sample_frame() }
}

// =============================================================================
// construction / reset
// =============================================================================

#[test]
fn new_manager_greets_in_language() {
    let mock = MockBoundary::default();
    let mgr = manager(&mock, Language::En);
    assert_eq!(mgr.messages().len(), 1);
    assert_eq!(mgr.messages()[0].text, strings(Language::En).greeting);
    assert_eq!(mgr.messages()[0].role, Role::Model);
    assert_eq!(mock.opened(), vec![Language::En]);
}

#[tokio::test]
async fn reset_session_opens_fresh_session_and_clears_transcript() {
    let mock = MockBoundary::default();
    let mut mgr = manager(&mock, Language::En);
    mgr.send_text("hello", &CancellationToken::new()).await;
    assert_eq!(mgr.messages().len(), 3);

    mgr.reset_session(Language::Hi);
    assert_eq!(mgr.language(), Language::Hi);
    assert_eq!(mock.opened(), vec![Language::En, Language::Hi]);
    assert_eq!(mgr.messages().len(), 1);
    assert_eq!(mgr.messages()[0].text, strings(Language::Hi).greeting);

    mgr.send_text("namaste", &CancellationToken::new()).await;
    assert_eq!(mock.sent().last().unwrap(), &(1, "namaste".to_string()));
}

// =============================================================================
// send_text
// =============================================================================

#[tokio::test]
async fn send_text_appends_user_then_reply_with_citations() {
    let mock = MockBoundary::default();
    let citation = Citation { uri: "https://pib.gov.in".into(), title: "PIB".into() };
    mock.push_reply(Ok(ChatReply { text: "It is a scam.".into(), citations: vec![citation.clone()] }));
    let mut mgr = manager(&mock, Language::En);

    let outcome = mgr.send_text("  is this real?  ", &CancellationToken::new()).await;
    assert_eq!(outcome, SendOutcome::Replied);

    let msgs = mgr.messages();
    assert_eq!(msgs.len(), 3);
    assert_eq!(msgs[1].role, Role::User);
    assert_eq!(msgs[1].text, "is this real?");
    assert_eq!(msgs[2].role, Role::Model);
    assert_eq!(msgs[2].citations, vec![citation]);
    assert_eq!(msgs[2].to_string(), "It is a scam.\n\n**Sources:**\n1. [PIB](https://pib.gov.in)");
    assert_eq!(mock.sent(), vec![(0, "is this real?".to_string())]);
}

#[tokio::test]
async fn blank_text_is_skipped() {
    let mock = MockBoundary::default();
    let mut mgr = manager(&mock, Language::En);
    assert_eq!(mgr.send_text("   ", &CancellationToken::new()).await, SendOutcome::Skipped);
    assert_eq!(mgr.messages().len(), 1);
    assert!(mock.sent().is_empty());
}

#[tokio::test]
async fn send_failure_keeps_user_message_and_adds_busy_reply() {
    let mock = MockBoundary::default();
    mock.push_reply(Err(LlmError::ApiRequest("timeout".into())));
    let mut mgr = manager(&mock, Language::En);

    let outcome = mgr.send_text("hello", &CancellationToken::new()).await;
    assert_eq!(outcome, SendOutcome::Failed(ErrorKind::ServiceUnavailable));

    let msgs = mgr.messages();
    assert_eq!(msgs.len(), 3);
    assert_eq!(msgs[1].text, "hello");
    assert_eq!(msgs[2].text, strings(Language::En).service_busy);
}

#[tokio::test]
async fn cancelled_send_keeps_user_message_without_busy_reply() {
    let mock = MockBoundary::default();
    let mut mgr = manager(&mock, Language::En);
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert_eq!(mgr.send_text("hello", &cancel).await, SendOutcome::Cancelled);
    assert_eq!(mgr.messages().len(), 2);
    assert_eq!(mgr.messages()[1].role, Role::User);
}

// =============================================================================
// send_voice
// =============================================================================

#[tokio::test]
async fn empty_transcript_sends_nothing() {
    let mock = MockBoundary::default();
    mock.push_transcript(Ok("  \n".into()));
    let mut mgr = manager(&mock, Language::Hi);

    let audio = MediaPayload::new("AAAA", "audio/webm");
    assert_eq!(mgr.send_voice(&audio, &CancellationToken::new()).await, SendOutcome::Skipped);
    assert_eq!(mgr.messages().len(), 1);
    assert!(mock.sent().is_empty());
    assert_eq!(mock.transcribe_count(), 1);
}

#[tokio::test]
async fn voice_transcript_is_sent_as_text() {
    let mock = MockBoundary::default();
    mock.push_transcript(Ok("Is this lottery real?".into()));
    mock.push_reply(Ok(ChatReply { text: "No.".into(), citations: vec![] }));
    let mut mgr = manager(&mock, Language::En);

    let audio = MediaPayload::new("AAAA", "audio/webm");
    assert_eq!(mgr.send_voice(&audio, &CancellationToken::new()).await, SendOutcome::Replied);
    assert_eq!(mgr.messages()[1].text, "Is this lottery real?");
    assert_eq!(mgr.messages()[2].text, "No.");
}

#[tokio::test]
async fn transcription_failure_adds_busy_reply() {
    let mock = MockBoundary::default();
    mock.push_transcript(Err(LlmError::ApiResponse { status: 503, body: String::new() }));
    let mut mgr = manager(&mock, Language::En);

    let audio = MediaPayload::new("AAAA", "audio/webm");
    let outcome = mgr.send_voice(&audio, &CancellationToken::new()).await;
    assert_eq!(outcome, SendOutcome::Failed(ErrorKind::ServiceUnavailable));
    assert_eq!(mgr.messages().len(), 2);
    assert_eq!(mgr.messages()[1].text, strings(Language::En).service_busy);
    assert!(mock.sent().is_empty());
}

// =============================================================================
// handle_scan
// =============================================================================

#[tokio::test]
async fn scan_replaces_placeholder_with_report() {
    let mock = MockBoundary::default();
    let mut result = sample_result(Verdict::Fake, Some(87.0));
    result.sources = vec![
        Source { web: Some(Citation { uri: "https://a.test".into(), title: "A".into() }) },
        Source::default(),
        Source { web: Some(Citation { uri: "https://b.test".into(), title: "B".into() }) },
    ];
    mock.push_analysis(Ok(result.clone()));
    let mut mgr = manager(&mock, Language::En);

    let outcome = mgr.handle_scan(scan(), &CancellationToken::new()).await;
    assert_eq!(outcome, ScanOutcome::Reported(result));

    let msgs = mgr.messages();
    assert_eq!(msgs.len(), 2);
    assert!(msgs.iter().all(|m| m.kind != MessageKind::Scanning));
    let report = &msgs[1];
    assert_eq!(report.kind, MessageKind::Report);
    assert_eq!(report.image.as_deref(), Some(sample_frame().to_data_uri().as_str()));
    assert!(report.text.contains("❌ Confirmed Fake"));
    assert!(report.text.contains("**Risk Level:** 87%"));
    assert!(report.text.contains("Checked against official sources."));
    assert_eq!(report.citations.len(), 2);
    assert!(report.to_string().contains("2. [B](https://b.test)"));

    let calls = mock.state.analyze_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, AnalysisInput::Media(sample_frame()));
    assert_eq!(calls[0].2, AnalysisMode::News);
}

#[tokio::test]
async fn scan_sends_hidden_context_update() {
    let mock = MockBoundary::default();
    mock.push_analysis(Ok(sample_result(Verdict::Suspicious, Some(55.0))));
    let mut mgr = manager(&mock, Language::En);

    mgr.handle_scan(scan(), &CancellationToken::new()).await;

    let sent = mock.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.starts_with("[INTERNAL SYSTEM UPDATE]"));
    assert!(sent[0].1.contains("Result: SUSPICIOUS"));
    assert!(mgr.messages().iter().all(|m| !m.text.contains("INTERNAL SYSTEM UPDATE")));
}

#[tokio::test]
async fn follow_up_after_scan_uses_same_session_and_lands_after_report() {
    let mock = MockBoundary::default();
    mock.push_analysis(Ok(sample_result(Verdict::Suspicious, Some(55.0))));
    mock.push_reply(Ok(ChatReply::default()));
    mock.push_reply(Ok(ChatReply { text: "Do not share the OTP.".into(), citations: vec![] }));
    let mut mgr = manager(&mock, Language::En);
    let cancel = CancellationToken::new();

    mgr.handle_scan(scan(), &cancel).await;
    assert_eq!(mgr.send_text("What should I do?", &cancel).await, SendOutcome::Replied);

    let sent = mock.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|(session, _)| *session == 0));
    assert_eq!(sent[1].1, "What should I do?");

    let msgs = mgr.messages();
    let kinds: Vec<_> = msgs.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MessageKind::Plain, MessageKind::Report, MessageKind::Plain, MessageKind::Plain]);
    assert!(msgs[1].text.contains("⚠️ Warning: Suspicious"));
    assert!(msgs[1].text.contains("55%"));
    assert_eq!(msgs[3].text, "Do not share the OTP.");
}

#[tokio::test]
async fn scan_failure_shows_scan_failed_without_placeholder() {
    let mock = MockBoundary::default();
    mock.push_analysis(Err(LlmError::ApiParse("bad json".into())));
    let mut mgr = manager(&mock, Language::En);

    let outcome = mgr.handle_scan(scan(), &CancellationToken::new()).await;
    assert_eq!(outcome, ScanOutcome::Failed(ErrorKind::MalformedResponse));

    let msgs = mgr.messages();
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[1].text, strings(Language::En).scan_failed);
    assert_eq!(msgs[1].kind, MessageKind::Plain);
    assert!(mock.sent().is_empty());
}

#[tokio::test]
async fn context_update_failure_is_not_surfaced() {
    let mock = MockBoundary::default();
    mock.push_analysis(Ok(sample_result(Verdict::Real, None)));
    mock.push_reply(Err(LlmError::ApiRequest("reset".into())));
    let mut mgr = manager(&mock, Language::En);

    let outcome = mgr.handle_scan(scan(), &CancellationToken::new()).await;
    assert!(matches!(outcome, ScanOutcome::Reported(_)));
    assert_eq!(mgr.messages().len(), 2);
    assert_eq!(mgr.messages()[1].kind, MessageKind::Report);
    assert!(mgr.messages()[1].text.contains("**Risk Level:** N/A"));
}

#[tokio::test]
async fn cancelled_scan_removes_placeholder() {
    let mock = MockBoundary::default();
    mock.push_analysis(Ok(sample_result(Verdict::Real, None)));
    let mut mgr = manager(&mock, Language::En);
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert_eq!(mgr.handle_scan(scan(), &cancel).await, ScanOutcome::Cancelled);
    let msgs = mgr.messages();
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[1].text, strings(Language::En).scan_failed);
    assert_eq!(mock.analyze_count(), 0);
}

// =============================================================================
// message rendering
// =============================================================================

#[test]
fn report_text_layout() {
    let result = sample_result(Verdict::Real, Some(12.4));
    let text = scan_report_text(&result, strings(Language::En));
    assert!(text.starts_with("📊 **Screen Scan Report**\n\n**Verdict:** ✅ Verified Real\n**Risk Level:** 12%"));
    assert!(text.ends_with("*Ask me anything about this result.*"));
}

#[test]
fn inline_links_are_detected() {
    let msg = ConversationMessage::new(Role::Model, "See [PIB](https://pib.gov.in) now", strings(Language::En));
    assert_eq!(msg.inline_links(), vec![Citation { uri: "https://pib.gov.in".into(), title: "PIB".into() }]);
    assert_eq!(msg.to_string(), "See [PIB](https://pib.gov.in) now");
}
