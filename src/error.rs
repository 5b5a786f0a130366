use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failures surfaced to the browser or API caller.
///
/// The `Display` text is the user-facing message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported language code: '{0}'")]
    UnknownLanguage(String),

    #[error("Could not detect the language. Please select manually.")]
    DetectionFailed,

    #[error("Translation error: Detected language '{0}' not supported.")]
    UnsupportedLanguage(String),

    #[error("Translation error: {0}")]
    Translation(#[source] anyhow::Error),

    #[error("Chat error: {0}")]
    Generation(#[source] anyhow::Error),

    #[error("Speech synthesis error: {0}")]
    Synthesis(#[source] anyhow::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnknownLanguage(_) => StatusCode::BAD_REQUEST,
            AppError::DetectionFailed | AppError::UnsupportedLanguage(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Translation(_) | AppError::Generation(_) | AppError::Synthesis(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::UnknownLanguage(_) => "unknown_language",
            AppError::DetectionFailed => "detection_failed",
            AppError::UnsupportedLanguage(_) => "unsupported_language",
            AppError::Translation(_) => "translation",
            AppError::Generation(_) => "generation",
            AppError::Synthesis(_) => "synthesis",
            AppError::Storage(_) => "storage",
        }
    }

    /// Log once at the boundary where the error is shown to the user.
    pub fn log(&self) {
        if self.status().is_server_error() {
            error!(kind = self.kind(), error = ?self, "{}", self);
        } else {
            warn!(kind = self.kind(), "{}", self);
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_what_the_pages_show() {
        assert_eq!(
            AppError::DetectionFailed.to_string(),
            "Could not detect the language. Please select manually."
        );
        assert_eq!(
            AppError::UnsupportedLanguage("ko".to_string()).to_string(),
            "Translation error: Detected language 'ko' not supported."
        );
        assert_eq!(
            AppError::Translation(anyhow::anyhow!("backend down")).to_string(),
            "Translation error: backend down"
        );
    }

    #[test]
    fn status_by_kind() {
        assert_eq!(
            AppError::Validation("No prompt provided".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsupportedLanguage("ko".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Generation(anyhow::anyhow!("timeout")).status(),
            StatusCode::BAD_GATEWAY
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(AppError::from(io).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
