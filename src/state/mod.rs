//! Application state.
//!
//! DESIGN
//! ======
//! The shell is a single-owner state machine. It is driven by the front end
//! through `&mut self` methods, so no locks are needed and two user actions
//! can never interleave.

pub mod shell;

pub use shell::{Alert, AppShell, BubbleAction, ShellError, Tab};
