use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai::{ParseError, ServiceError};
use crate::document::actions::ValidationError;
use crate::export::{CaptureError, PackagingError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("A {0} export is already in progress")]
    Busy(&'static str),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Invalid(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Busy(kind) => (
                StatusCode::CONFLICT,
                "EXPORT_BUSY",
                format!("A {kind} export is already in progress"),
            ),
            AppError::Capture(e) => {
                tracing::error!("PDF capture failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_FAILED",
                    "Could not generate the PDF. Please try again.".to_string(),
                )
            }
            AppError::Packaging(e) => {
                tracing::error!("DOCX packaging failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_FAILED",
                    "Could not generate the DOCX file. Please try again.".to_string(),
                )
            }
            AppError::Service(e) => {
                tracing::error!("Content service error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVICE_ERROR",
                    "The AI service request failed. Please try again.".to_string(),
                )
            }
            AppError::Parse(ParseError::Service(e)) => {
                tracing::error!("Résumé parsing failed: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PARSE_ERROR",
                    "The résumé could not be parsed. Try another file.".to_string(),
                )
            }
            AppError::Parse(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_service_error_message_is_generic() {
        let response = AppError::Service(ServiceError::Api {
            status: 401,
            message: "API key not valid: sk-secret".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "SERVICE_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_upload_rejections_are_bad_requests() {
        let response = AppError::Parse(ParseError::EmptyFile).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            AppError::Parse(ParseError::Service(ServiceError::EmptyContent)).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_busy_is_conflict() {
        let response = AppError::Busy("pdf").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "EXPORT_BUSY");
    }
}
