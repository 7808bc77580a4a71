use crate::services::prompt_parser::ParseError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Access token required")]
    MissingToken,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Spotify error: {0}")]
    Spotify(String),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Failed to parse AI response: {0}")]
    ModelResponse(#[from] ParseError),

    #[error("AI prompt parsing is not configured")]
    AiUnavailable,

    /// Upstream failure reported to the caller as `message` only
    #[error("{message}")]
    Operation {
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Hide upstream detail behind a generic, operation-specific message.
    /// Caller-side errors keep their own response.
    pub fn during(self, message: &'static str) -> AppError {
        match self {
            AppError::Spotify(_) | AppError::LanguageModel(_) | AppError::Internal(_) => {
                AppError::Operation {
                    message,
                    source: Box::new(self),
                }
            }
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::MissingToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AiUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::ModelResponse(ref e) => {
                tracing::error!("Model response parse error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to parse AI response".to_string(),
                )
            }
            AppError::Spotify(ref e) => {
                tracing::error!("Spotify error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Spotify request failed".to_string())
            }
            AppError::LanguageModel(ref e) => {
                tracing::error!("Language model error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Language model request failed".to_string(),
                )
            }
            AppError::Operation { message, ref source } => {
                tracing::error!("{}: {}", message, source);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
