//! Error types for widget generation, storage and the screens

use thiserror::Error;

/// Result type alias for widgetsmith operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating, storing or presenting widgets.
///
/// The `Display` text of every variant is written for the person using the
/// app: screens surface it verbatim as a blocking notice.
#[derive(Error, Debug)]
pub enum Error {
    /// No API credential was configured for the hosted model
    #[error("Gemini API key not configured. Please set {}", crate::config::API_KEY_ENV)]
    MissingCredential,

    /// The configured model does not exist (HTTP 404 or a "not found" message)
    #[error("Model not found. Please ensure you're using a valid model name (current: {0}).")]
    ModelNotFound(String),

    /// The credential was rejected by the remote service
    #[error("Invalid API key. Please check your {}.", crate::config::API_KEY_ENV)]
    InvalidCredential,

    /// Any other failure reported by the remote service
    #[error("{0}")]
    Remote(String),

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Writing to (or removing from) the key-value backend failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Records could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The user tried to generate without describing anything
    #[error("Please enter a prompt")]
    EmptyPrompt,

    /// A widget id that is not in the store
    #[error("Widget not found: {0}")]
    NotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl Error {
    /// Whether the failure came from talking to the hosted model.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::ModelNotFound(_) | Error::InvalidCredential | Error::Remote(_) | Error::Network(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(Error::EmptyPrompt.to_string(), "Please enter a prompt");
        assert!(Error::MissingCredential.to_string().contains("WIDGETSMITH_API_KEY"));
        assert!(Error::InvalidCredential.to_string().starts_with("Invalid API key"));
        assert_eq!(Error::Remote("quota exceeded".into()).to_string(), "quota exceeded");
    }

    #[test]
    fn remote_classification() {
        assert!(Error::ModelNotFound("m".into()).is_remote());
        assert!(Error::Network("reset".into()).is_remote());
        assert!(!Error::MissingCredential.is_remote());
        assert!(!Error::Storage("disk full".into()).is_remote());
    }
}
