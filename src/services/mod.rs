//! Domain services driven by the application shell.
//!
//! ARCHITECTURE
//! ============
//! Each service owns one concern (conversation, report rendering, playback,
//! capture, sharing) and talks to the model only through
//! [`crate::llm::AiBoundary`]. None of them hold global state.

pub mod capture;
pub mod conversation;
pub mod playback;
pub mod report;
pub mod share;

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Drive `fut` unless `cancel` fires first. Cancellation wins ties, and the
/// losing future is dropped before this returns.
pub async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}

/// Hands out one cancellation token per user action and routes interrupts
/// to the newest one. Earlier tokens are retired, not cancelled, so an
/// interrupt always reaches whatever is running now.
#[derive(Debug, Default)]
pub struct InterruptRouter {
    current: Mutex<CancellationToken>,
}

impl InterruptRouter {
    /// A fresh token for the next action.
    pub fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        token
    }

    /// Cancel the most recently armed token.
    pub fn trip(&self) {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).cancel();
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
