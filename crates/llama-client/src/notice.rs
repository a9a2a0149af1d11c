//! User-facing notices for CRUD results

use crate::resources::ResourceKind;
use crate::ClientError;
use std::fmt;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation succeeded
    Success,
    /// Needs the user's attention but nothing failed
    Warning,
    /// Operation failed
    Error,
}

/// One message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text
    pub message: String,
}

impl Notice {
    /// Success notice
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Warning notice
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Error notice
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// A list could not be read
    #[must_use]
    pub fn load_failed(kind: ResourceKind) -> Self {
        Self::error(format!("Failed to load {}", kind.plural()))
    }

    /// A record was created or updated
    #[must_use]
    pub fn saved(kind: ResourceKind, created: bool) -> Self {
        let verb = if created { "created" } else { "updated" };
        Self::success(format!("{} {verb}", kind.singular()))
    }

    /// A create or update failed
    #[must_use]
    pub fn save_failed(err: &ClientError) -> Self {
        Self::error(err.user_message("Failed to save"))
    }

    /// A record was deleted
    #[must_use]
    pub fn deleted(kind: ResourceKind) -> Self {
        Self::success(format!("{} deleted", kind.singular()))
    }

    /// A delete failed
    ///
    /// Prefers the backend's message, then the resource's likely cause.
    #[must_use]
    pub fn delete_failed(kind: ResourceKind, err: &ClientError) -> Self {
        let fallback = kind.dependents_message().unwrap_or("Failed to delete");
        Self::error(err.user_message(fallback))
    }

    /// Whether this notice reports a failure
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NoticeLevel::Error)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
