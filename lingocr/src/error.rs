use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LingocrError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl LingocrError {
    /// Client-caused failures surface as 400, everything else is the server's fault.
    pub fn status(&self) -> StatusCode {
        match self {
            LingocrError::Validation(_)
            | LingocrError::Fetch(_)
            | LingocrError::Decode(_)
            | LingocrError::UrlParse(_) => StatusCode::BAD_REQUEST,
            LingocrError::OcrUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LingocrError::Extraction(_)
            | LingocrError::Io(_)
            | LingocrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LingocrError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            LingocrError::Validation(msg)
            | LingocrError::Fetch(msg)
            | LingocrError::Decode(msg)
            | LingocrError::OcrUnavailable(msg) => msg.clone(),
            LingocrError::UrlParse(e) => format!("invalid image url: {e}"),
            LingocrError::Extraction(_) => {
                tracing::error!(error = %self, "Text extraction failed");
                "failed to extract text from image".to_string()
            }
            LingocrError::Io(_) | LingocrError::Internal(_) => {
                tracing::error!(error = %self, "Internal error while serving request");
                "An internal error occurred".to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, LingocrError>;
