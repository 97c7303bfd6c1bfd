//! Satyam — misinformation and scam checking backed by a hosted model.
//!
//! ARCHITECTURE
//! ============
//! `llm` is the only module that talks to the network. `services` build the
//! conversation, report, playback, capture, and share behavior on top of the
//! [`llm::AiBoundary`] trait, and `state` wires them into the application
//! shell that the `satyam` binary drives from a terminal.

pub mod audio;
pub mod error;
pub mod i18n;
pub mod llm;
pub mod model;
pub mod services;
pub mod state;
