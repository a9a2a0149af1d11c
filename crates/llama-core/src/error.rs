//! Error types for the Llama Matemática admin client

use std::{error::Error as StdError, fmt};

/// Main error type for the core crate
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Local storage error
    Storage(String),

    /// Not found error
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// Serialization error
    Serialization(serde_json::Error),

    /// Other error
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a validation error for a form field
    #[must_use]
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Storage(msg) => write!(f, "Storage error: {msg}"),
            Self::NotFound { resource } => write!(f, "Resource not found: {resource}"),
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let app_error = Error::from(io_error);

        match app_error {
            Error::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }

        assert!(app_error.to_string().contains("I/O error"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_validation_error() {
        let error = Error::validation("ciclo_id", "Select a cycle");

        assert_eq!(
            error.to_string(),
            "Validation error: ciclo_id - Select a cycle"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn test_storage_error() {
        let error = Error::Storage("disk full".to_string());
        assert_eq!(error.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#)
            .unwrap_err();
        let app_error = Error::from(json_error);

        assert!(matches!(app_error, Error::Serialization(_)));
        assert!(app_error.to_string().contains("Serialization error"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_all_error_display_variants() {
        let test_cases = vec![
            (Error::Io(io::Error::other("test")), "I/O error:"),
            (
                Error::configuration("bad url"),
                "Configuration error: bad url",
            ),
            (
                Error::NotFound {
                    resource: "lesson 9".to_string(),
                },
                "Resource not found: lesson 9",
            ),
            (Error::Other("other error".to_string()), "other error"),
        ];

        for (error, expected_contains) in test_cases {
            let display_str = error.to_string();
            assert!(
                display_str.contains(expected_contains),
                "Error display '{display_str}' should contain '{expected_contains}'"
            );
        }
    }
}
