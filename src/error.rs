//! Error handling for the intake scanner
//!
//! Nothing in here is fatal to the terminal: every variant maps back to an
//! operator-visible feedback class (or to none at all, for recognition noise).

use crate::feedback::Tone;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Missing or malformed scan input, caught before any network call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("date is required")]
    MissingDate,

    #[error("client is required")]
    MissingClient,

    #[error("container is required")]
    MissingContainer,

    #[error("quantity must be non-zero")]
    ZeroQuantity,

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Transient capture/recognition failure inside the camera loop
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// The feed produced no usable frame this attempt
    #[error("no frame available: {0}")]
    NoFrame(String),

    /// The feed could not be opened at all
    #[error("camera feed unavailable: {0}")]
    FeedUnavailable(String),

    /// OCR pass failed
    #[error("recognizer error: {0}")]
    Recognizer(String),
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required field missing before submission
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Server rejected or failed the ledger call
    #[error("Submission error: {0}")]
    Submission(String),

    /// Undo requested with nothing to undo
    #[error("Nothing to undo")]
    NoOp,

    /// Camera/OCR failure
    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True for transport or server failures on a ledger call
    pub fn is_submission_failure(&self) -> bool {
        matches!(
            self,
            Error::Submission(_) | Error::Http(_) | Error::Serialization(_)
        )
    }

    /// Feedback tone for this error, if the operator should hear one
    pub fn tone(&self) -> Option<Tone> {
        match self {
            Error::Validation(_) | Error::NoOp => Some(Tone::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_classes() {
        assert_eq!(
            Error::from(ValidationError::MissingClient).tone(),
            Some(Tone::Error)
        );
        assert_eq!(Error::NoOp.tone(), Some(Tone::Error));
        assert_eq!(Error::Submission("502".to_string()).tone(), None);
        assert_eq!(
            Error::from(RecognitionError::NoFrame("empty".to_string())).tone(),
            None
        );
    }

    #[test]
    fn test_submission_classification() {
        assert!(Error::Submission("boom".to_string()).is_submission_failure());
        assert!(!Error::NoOp.is_submission_failure());
        assert!(!Error::from(ValidationError::MissingDate).is_submission_failure());
    }
}
