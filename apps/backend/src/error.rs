//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use vocab_core::DrillError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DrillError> for ApiError {
    fn from(err: DrillError) -> Self {
        match err {
            DrillError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DrillError::InvalidInput(msg) => ApiError::BadRequest(msg),
            DrillError::Unavailable(msg) => ApiError::Unavailable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            ApiError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::{LearnerId, Partition, Transition, WordId};

    #[test]
    fn test_unauthorized_status() {
        let error = ApiError::Unauthorized("revoked token".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_conflict_status() {
        let error = ApiError::Conflict("email taken".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unavailable_status() {
        let error = ApiError::Unavailable("pool closed".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_config_error_status() {
        let error = ApiError::Config("DATABASE_URL must be set".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_drill_not_found_maps_to_404() {
        let drill = Transition::Retire
            .apply(LearnerId::new_v4(), WordId::new_v4(), Some(Partition::Assigned))
            .unwrap_err();
        let error = ApiError::from(drill);
        assert!(matches!(error, ApiError::NotFound(_)));
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_drill_invalid_input_maps_to_400() {
        let error = ApiError::from(DrillError::InvalidInput("limit".to_string()));
        assert_eq!(error.to_string(), "Bad request: limit");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_drill_unavailable_maps_to_503() {
        let error = ApiError::from(DrillError::Unavailable("down".to_string()));
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_drill_input_is_internal() {
        let error = ApiError::from(DrillError::Input("closed".to_string()));
        assert!(matches!(error, ApiError::Internal(_)));
    }

    #[test]
    fn test_error_display_not_found() {
        let error = ApiError::NotFound("word 123".to_string());
        assert_eq!(error.to_string(), "Not found: word 123");
    }
}
