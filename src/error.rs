//! Hard failures surfaced by the engine.
//!
//! Ambiguous or missing driver/date information is never an error; it is
//! reported as an [`Issue`](crate::transcript::Issue) on the affected block.

use std::path::PathBuf;

/// Errors that stop a parsing run before any block is produced.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to read transcript: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Transcript is not valid UTF-8: {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Invalid pattern built from configuration: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
