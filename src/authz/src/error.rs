//! Error types for the authorization engine

use thiserror::Error;

/// Authorization engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// Caller or grant is malformed (zero ids, missing recipient, level above ceiling)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller lacks the permission required for the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A repository lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected repository or engine failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthzError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this is the benign "nothing stored" outcome of a lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Folds a repository `NotFound` into `None`, leaving every other error intact.
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(AuthzError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthzError::permission_denied("permission level too low");
        assert_eq!(err.to_string(), "Permission denied: permission level too low");

        let err = AuthzError::invalid_argument("recipient is required");
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_optional_folds_not_found() {
        let missing: Result<u32> = Err(AuthzError::not_found("standard access"));
        assert_eq!(missing.optional(), Ok(None));

        let found: Result<u32> = Ok(7);
        assert_eq!(found.optional(), Ok(Some(7)));
    }

    #[test]
    fn test_optional_keeps_other_errors() {
        let failed: Result<u32> = Err(AuthzError::internal("connection reset"));
        assert_eq!(failed.optional(), Err(AuthzError::internal("connection reset")));
    }
}
