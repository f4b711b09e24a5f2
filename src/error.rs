//! Error types for PulseTrack.
//!
//! Tracking itself is best-effort and infallible by design; only the
//! configuration and export paths can fail.

use thiserror::Error;

/// Errors surfaced by configuration handling and snapshot export.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
