//! Error types for texset.
//!
//! Library crates use [`TexsetError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all texset operations.
#[derive(Debug, thiserror::Error)]
pub enum TexsetError {
    /// Allow-list configuration error (missing key, bad identity, ambiguous claim).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network error while downloading an attachment.
    #[error("network error: {0}")]
    Network(String),

    /// Unreadable, corrupt, or unwritable archive.
    #[error("archive error: {message}")]
    Archive { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Outbound send failure reported by the message sink.
    #[error("send error: {0}")]
    Send(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TexsetError>;

impl TexsetError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an archive error from any displayable message.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = TexsetError::config("ADMIN_USER_IDS is not set");
        assert_eq!(err.to_string(), "config error: ADMIN_USER_IDS is not set");

        let err = TexsetError::archive("central directory not found");
        assert!(err.to_string().contains("central directory"));
    }
}
