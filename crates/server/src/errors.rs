use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::{FieldErrors, ServiceError};

/// JSON error body: `{"error": title, "detail": message|null, "fields": {...}}`.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(rename = "error")]
    pub title: String,
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &str, detail: Option<String>) -> Self {
        Self { status, title: title.to_string(), detail, fields: None }
    }

    pub fn invalid_fields(fields: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            title: "Validation Error".into(),
            detail: Some(fields.to_string()),
            fields: Some(fields),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(detail.into()))
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(detail.into()))
    }

    /// 500 with a generic detail; the cause goes to the log only.
    pub fn internal(title: &str, cause: impl std::fmt::Display) -> Self {
        error!(title, cause = %cause, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, title, Some(INTERNAL_DETAIL.into()))
    }
}

pub const INTERNAL_DETAIL: &str = "An internal error occurred.";

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidFields(fields) => Self::invalid_fields(fields),
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg))
            }
            ServiceError::InvalidState(msg) => Self::new(StatusCode::BAD_REQUEST, "Invalid State", Some(msg)),
            ServiceError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, "Forbidden", Some(msg)),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "Conflict", Some(msg)),
            ServiceError::Db(msg) | ServiceError::Model(ModelError::Db(msg)) => Self::internal("DB Error", msg),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidFields(fields) => Self::invalid_fields(fields),
            AuthError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "Conflict", Some(e.to_string())),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string())),
            AuthError::Unauthorized | AuthError::TokenError(_) => Self::unauthorized(e.to_string()),
            AuthError::HashError(_) | AuthError::Repository(_) => Self::internal("Auth Error", &e),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("bootstrap failed: {0}")]
    Bootstrap(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::forbidden("x"), StatusCode::FORBIDDEN),
            (ServiceError::not_found("visit request"), StatusCode::NOT_FOUND),
            (ServiceError::InvalidState("no".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ServiceError::Db("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn field_errors_are_exposed() {
        let err = JsonApiError::from(ServiceError::InvalidFields(FieldErrors::single("jardinero_id", "missing")));
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["error"], "Validation Error");
        assert_eq!(body["fields"]["jardinero_id"][0], "missing");
    }

    #[test]
    fn token_problems_are_unauthorized() {
        assert_eq!(JsonApiError::from(AuthError::TokenError("expired".into())).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::UNAUTHORIZED);
        let body = serde_json::to_value(JsonApiError::from(AuthError::Conflict)).unwrap();
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn server_errors_hide_the_cause() {
        let err = JsonApiError::from(ServiceError::Db("relation \"visit_request\" does not exist".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["error"], "DB Error");
        assert_eq!(body["detail"], INTERNAL_DETAIL);

        let body = serde_json::to_value(JsonApiError::from(AuthError::Repository("pool timed out".into()))).unwrap();
        assert_eq!(body["detail"], INTERNAL_DETAIL);
    }
}
