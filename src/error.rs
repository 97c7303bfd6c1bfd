//! Error taxonomy shared across layers.
//!
//! DESIGN
//! ======
//! Each layer owns its own `thiserror` enum. They all implement [`ErrorCode`]
//! so callers can branch on a coarse [`ErrorKind`] and log a grepable code
//! without matching on every variant. Nothing here is fatal to the process;
//! the kind decides which localized message the user sees.

/// User-facing failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user declined microphone or screen-capture permission.
    CapabilityDenied,
    /// Network or model failure.
    ServiceUnavailable,
    /// The model answered with something we could not parse.
    MalformedResponse,
    /// The caller cancelled the in-flight operation.
    Cancelled,
    /// Missing or invalid local configuration.
    Configuration,
}

/// Grepable error codes plus a taxonomy bucket.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;

    fn kind(&self) -> ErrorKind;

    /// Whether a later manual attempt could succeed. Nothing in this crate
    /// retries automatically.
    fn retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ServiceUnavailable)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
