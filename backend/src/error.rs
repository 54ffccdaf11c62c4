//! Error handling for the bookstore dashboard service
//!
//! Provides consistent error responses in English and Thai

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    // External service errors
    #[error("Gemini API Key is not configured on the server.")]
    AiNotConfigured,

    #[error("AI provider unavailable: {0}")]
    AiProviderUnavailable(String),

    #[error("AI provider error: {0}")]
    AiProviderError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

impl From<shared::PeriodError> for AppError {
    fn from(error: shared::PeriodError) -> Self {
        AppError::Internal(error.to_string())
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message_th: String,
}

impl AppError {
    /// Status, code, and client-facing messages for this error
    fn describe(&self) -> (StatusCode, &'static str, String, String) {
        match self {
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                format!("ข้อมูลไม่ถูกต้อง: {}", msg),
            ),
            AppError::AiNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI_NOT_CONFIGURED",
                self.to_string(),
                "ยังไม่ได้ตั้งค่า Gemini API Key บนเซิร์ฟเวอร์".to_string(),
            ),
            AppError::AiProviderUnavailable(msg) | AppError::AiProviderError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                if matches!(self, AppError::AiProviderUnavailable(_)) {
                    "AI_PROVIDER_UNAVAILABLE"
                } else {
                    "AI_PROVIDER_ERROR"
                },
                format!("AI analysis failed: {}", msg),
                format!("เกิดข้อผิดพลาดในการประมวลผลการวิเคราะห์ด้วย AI: {}", msg),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Internal server error".to_string(),
                "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
            ),
            AppError::Internal(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
                "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, message_th) = self.describe();

        // Log the error for debugging
        tracing::error!(code, "Error: {:?}", self);

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            message_th,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_hide_details() {
        let (status, code, message, _) = AppError::DatabaseError(sqlx::Error::PoolTimedOut).describe();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "DATABASE_ERROR");
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_provider_errors_embed_failure_text() {
        let (status, code, message, message_th) =
            AppError::AiProviderUnavailable("503 Service Unavailable".to_string()).describe();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "AI_PROVIDER_UNAVAILABLE");
        assert!(message.contains("503 Service Unavailable"));
        assert!(message_th.contains("503 Service Unavailable"));

        let (_, code, _, _) = AppError::AiProviderError("bad request".to_string()).describe();
        assert_eq!(code, "AI_PROVIDER_ERROR");
    }

    #[test]
    fn test_missing_ai_configuration() {
        let (status, code, message, _) = AppError::AiNotConfigured.describe();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "AI_NOT_CONFIGURED");
        assert_eq!(message, "Gemini API Key is not configured on the server.");
    }

    #[test]
    fn test_validation_is_bad_request() {
        let response = AppError::ValidationError("monthlyIncome too long".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
