use thiserror::Error;

use crate::errors::{FieldErrors, ServiceError};

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid input: {0}")]
    InvalidFields(FieldErrors),
    #[error("user already exists")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::InvalidFields(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => ServiceError::Validation(msg),
            AuthError::InvalidFields(fields) => ServiceError::InvalidFields(fields),
            AuthError::Conflict => ServiceError::Conflict("user already exists".into()),
            AuthError::NotFound => ServiceError::not_found("account"),
            AuthError::Unauthorized => ServiceError::Forbidden("invalid credentials".into()),
            other => ServiceError::Db(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AuthError::Conflict.code(), 1002);
        assert_eq!(AuthError::Unauthorized.code(), 1004);
        assert_eq!(AuthError::Repository("x".into()).code(), 1200);
    }

    #[test]
    fn not_found_maps_to_service_not_found() {
        assert!(matches!(ServiceError::from(AuthError::NotFound), ServiceError::NotFound(_)));
        assert!(matches!(ServiceError::from(AuthError::Repository("down".into())), ServiceError::Db(_)));
    }
}
