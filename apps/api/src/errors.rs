use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The authentication kinds are deliberately separate variants — callers can
/// distinguish a missing credential from an expired or tampered one, and an
/// expired token must never surface as `Unauthenticated`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("No account matches the token subject")]
    UnknownCaller,

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No document bytes were supplied")]
    EmptyInput,

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("Inference service unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("Malformed model output: {detail}")]
    MalformedModelOutput { detail: String, raw: String },

    #[error("Incomplete model output: missing field '{missing_field}'")]
    IncompleteModelOutput {
        missing_field: &'static str,
        raw: String,
    },

    #[error("Invalid score format: '{value}'")]
    InvalidScoreFormat { value: String, raw: String },

    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Raw inference-service text attached to normalization failures.
    /// Preserved in the error body so callers can inspect what the model
    /// actually returned.
    fn raw_response(&self) -> Option<&str> {
        match self {
            AppError::MalformedModelOutput { raw, .. }
            | AppError::IncompleteModelOutput { raw, .. }
            | AppError::InvalidScoreFormat { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid token".to_string(),
            ),
            AppError::UnknownCaller => (
                StatusCode::UNAUTHORIZED,
                "UNKNOWN_CALLER",
                "No account matches the token subject".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::EmptyInput => (
                StatusCode::BAD_REQUEST,
                "EMPTY_INPUT",
                "No document bytes were supplied".to_string(),
            ),
            AppError::UnsupportedDocument(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNSUPPORTED_DOCUMENT",
                msg.clone(),
            ),
            AppError::InferenceUnavailable(msg) => {
                tracing::error!("Inference service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INFERENCE_UNAVAILABLE",
                    "The inference service could not be reached".to_string(),
                )
            }
            AppError::MalformedModelOutput { detail, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MALFORMED_MODEL_OUTPUT",
                format!("Model output could not be parsed: {detail}"),
            ),
            AppError::IncompleteModelOutput { missing_field, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INCOMPLETE_MODEL_OUTPUT",
                format!("Model output is missing the '{missing_field}' field"),
            ),
            AppError::InvalidScoreFormat { value, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_SCORE_FORMAT",
                format!("Model returned an unparseable match score: '{value}'"),
            ),
            AppError::PersistenceFailed(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILED",
                    "A database error occurred".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        if let Some(raw) = self.raw_response() {
            body["error"]["raw_response"] = json!(raw);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_kinds_map_to_distinct_401s() {
        for err in [
            AppError::Unauthenticated,
            AppError::TokenExpired,
            AppError::TokenInvalid,
            AppError::UnknownCaller,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(
            AppError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_model_output_failures_are_unprocessable() {
        let err = AppError::MalformedModelOutput {
            detail: "not json".to_string(),
            raw: "not json".to_string(),
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_inference_unavailable_is_bad_gateway() {
        let err = AppError::InferenceUnavailable("connection refused".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_empty_input_is_bad_request() {
        assert_eq!(
            AppError::EmptyInput.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
