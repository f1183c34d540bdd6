use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use recibos_import::ImportError;
use recibos_ocr::PipelineError;
use recibos_pdf::BatchError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Invalid data provided")]
    InvalidData,
    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Image(#[from] PipelineError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::InvalidData => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Import(ImportError::Empty) => StatusCode::BAD_REQUEST,
            ApiError::Import(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Batch(
                BatchError::NoRecords | BatchError::NoValidRecords | BatchError::NumberOverflow { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Batch(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client. Internal causes are only logged.
    fn public_message(&self) -> String {
        match self {
            ApiError::Image(e) => e.user_message().to_string(),
            ApiError::Import(ImportError::Empty) => self.to_string(),
            ApiError::Import(_) => "Failed to process upload".to_string(),
            ApiError::Batch(
                BatchError::NoRecords | BatchError::NoValidRecords | BatchError::NumberOverflow { .. },
            ) => self.to_string(),
            ApiError::Batch(_) => "Failed to generate receipts".to_string(),
            ApiError::Task(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
