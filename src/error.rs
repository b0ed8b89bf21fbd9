// Error types for notebin
// Stale ids and the last-note guard are not errors: they are no-ops in the store

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),
}

pub type Result<T> = core::result::Result<T, Error>;
