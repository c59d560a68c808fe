use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors at the editor's persistence boundary.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("content is not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed session file: {0}")]
    Session(#[from] serde_json::Error),

    #[error("unsupported session version {0}")]
    UnsupportedSessionVersion(u32),
}

pub type Result<T> = std::result::Result<T, EditorError>;
