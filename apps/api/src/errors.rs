use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::feedback::analyzer::AnalyzerError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The model replied with something that is not a JSON object.
    #[error("AI returned malformed output")]
    AiFormat,

    /// The completion call itself failed (network, provider status, empty reply).
    #[error("AI call failed: {0}")]
    AiCall(String),

    #[error("AI response missing field: {0}")]
    AiMissingField(&'static str),

    #[error("AI response has invalid field: {0}")]
    AiInvalidField(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AnalyzerError> for AppError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Format(_) => AppError::AiFormat,
            AnalyzerError::Call(msg) => AppError::AiCall(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::AiFormat => (
                StatusCode::BAD_GATEWAY,
                "AI_FORMAT_ERROR",
                "AI returned unexpected format. Try again.".to_string(),
            ),
            AppError::AiCall(msg) => (
                StatusCode::BAD_GATEWAY,
                "AI_CALL_ERROR",
                format!("AI analysis failed: {msg}"),
            ),
            AppError::AiMissingField(field) => (
                StatusCode::BAD_GATEWAY,
                "AI_SCHEMA_ERROR",
                format!("AI response missing field: {field}"),
            ),
            AppError::AiInvalidField(field) => (
                StatusCode::BAD_GATEWAY,
                "AI_SCHEMA_ERROR",
                format!("AI response has invalid field: {field}"),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        // `error` stays a plain string; browser clients read it directly.
        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_per_kind() {
        let cases = [
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::AiFormat, StatusCode::BAD_GATEWAY),
            (AppError::AiCall("timeout".into()), StatusCode::BAD_GATEWAY),
            (AppError::AiMissingField("score"), StatusCode::BAD_GATEWAY),
            (AppError::AiInvalidField("suggestions"), StatusCode::BAD_GATEWAY),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_analyzer_errors_map_to_ai_kinds() {
        let parse_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        assert!(matches!(
            AppError::from(AnalyzerError::Format(parse_err)),
            AppError::AiFormat
        ));
        match AppError::from(AnalyzerError::Call("timed out".to_string())) {
            AppError::AiCall(msg) => assert_eq!(msg, "timed out"),
            other => panic!("expected AiCall, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_field_body_names_field() {
        let response = AppError::AiMissingField("suggestions").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "AI response missing field: suggestions");
        assert_eq!(body["code"], "AI_SCHEMA_ERROR");
    }
}
