use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("No suitable extractor found for URL: {0}")]
    UnsupportedUrl(String),

    #[error("Could not resolve video: {0}")]
    Resolution(String),

    #[error("No suitable formats available for this video")]
    NoSuitableFormats,

    #[error("'{0}' is not an itag listed for this video")]
    InvalidSelection(String),

    #[error("Input closed before a selection was made")]
    InputClosed,

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered HTTP {status} after {attempts} attempt(s)")]
    HttpStatus { status: u16, attempts: u32 },

    #[error("Download interrupted mid-transfer: {0}")]
    Stream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Download aborted by user")]
    Interrupted,
}

impl Error {
    /// Whether an interactive session can report this error and go back to the URL prompt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::InputClosed | Error::Config(_) | Error::Interrupted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::NoSuitableFormats.is_recoverable());
        assert!(Error::Resolution("video unavailable".into()).is_recoverable());
        assert!(Error::Stream("connection reset".into()).is_recoverable());
        assert!(!Error::InputClosed.is_recoverable());
        assert!(!Error::Interrupted.is_recoverable());
    }

    #[test]
    fn test_messages_keep_underlying_cause() {
        let err = Error::CreateDirectory {
            path: PathBuf::from("/nope/audio"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let message = err.to_string();
        assert!(message.contains("/nope/audio"));
        assert!(message.contains("permission denied"));
    }
}
