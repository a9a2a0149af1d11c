//! Error types for the admin client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the backend or managing the session
#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend answered 401
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("session rejected"))]
    Unauthorized {
        /// Backend `error` message, if any
        message: Option<String>,
    },

    /// The backend answered with another non-success status
    #[error("Request failed with status {status}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        /// HTTP status code
        status: u16,
        /// Backend `error` message, if any
        message: Option<String>,
    },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("Unexpected response from {path}: {reason}")]
    Decode {
        /// Request path
        path: String,
        /// Decoder message
        reason: String,
    },

    /// Local storage failure
    #[error("Storage error: {message}")]
    Storage {
        /// Error message
        message: String,
    },

    /// The backend offers no such operation for the resource
    #[error("{resource} cannot be {operation}")]
    Unsupported {
        /// Resource name
        resource: String,
        /// Attempted operation, as a past participle
        operation: &'static str,
    },

    /// The user declined a confirmation
    #[error("Operation cancelled")]
    Cancelled,

    /// Core error (validation, configuration, I/O)
    #[error(transparent)]
    Core(#[from] llama_core::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Create a storage error
    #[must_use]
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether this is a 401 answer
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status, when the backend answered
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the backend put in its `{"error": ...}` body
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message to show the user: the backend's own, else `fallback`
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Core(llama_core::Error::Validation { message, .. }) => message.clone(),
            _ => self
                .backend_message()
                .map_or_else(|| fallback.to_string(), ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_display() {
        let err = ClientError::Status {
            status: 409,
            message: Some("El curso tiene temas".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Request failed with status 409: El curso tiene temas"
        );

        let err = ClientError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "Request failed with status 500");
    }

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = ClientError::Status {
            status: 400,
            message: Some("Correo duplicado".to_string()),
        };
        assert_eq!(err.user_message("Failed to save"), "Correo duplicado");

        let err = ClientError::Cancelled;
        assert_eq!(err.user_message("Failed to save"), "Failed to save");
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = ClientError::from(llama_core::Error::validation("ciclo_id", "Select a cycle"));
        assert_eq!(err.user_message("Failed to save"), "Select a cycle");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_unauthorized_flags() {
        let err = ClientError::Unauthorized { message: None };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Unauthorized: session rejected");
    }
}
