//! Core domain + application logic for the SnapSend chat gateway.
//!
//! This crate is intentionally transport-agnostic. The chat transport (Telegram
//! today) and the AI backend (Gemini) live behind ports (traits) implemented in
//! adapter crates.

pub mod ai;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod readiness;
pub mod router;
pub mod transport;

#[cfg(test)]
mod testing;

pub use errors::{DispatchError, Error, Result};
