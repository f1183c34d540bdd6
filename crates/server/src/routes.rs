use std::path::Path;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use recibos_core::{EmployeeRecord, PayrollExtraction};
use recibos_import::{import_spreadsheet, SheetFormat};
use recibos_pdf::generate_receipts;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::task::spawn_blocking;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff"];

pub const ARCHIVE_NAME: &str = "recibos.zip";

// ── Health ───────────────────────────────────────────────────────────────────

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Receipt Generator API is running" }))
}

// ── Upload ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub filename: String,
    #[serde(flatten)]
    pub extraction: PayrollExtraction,
    #[serde(rename = "ocrText", skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
}

struct UploadedFile {
    name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

impl UploadedFile {
    fn is_image(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        let by_extension = Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        by_type || by_extension
    }
}

async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(UploadedFile { name, content_type, bytes });
    }
    Err(ApiError::MissingFile)
}

/// Accepts a spreadsheet or a photo of one and returns the detected records.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_file_field(&mut multipart).await?;
    info!(filename = %file.name, bytes = file.bytes.len(), image = file.is_image(), "upload received");

    let response = if file.is_image() {
        let pipeline = state.pipeline.clone();
        let bytes = file.bytes;
        let result = spawn_blocking(move || pipeline.process_bytes(&bytes)).await??;
        UploadResponse {
            message: "Image processed successfully",
            filename: file.name,
            extraction: result.extraction,
            ocr_text: Some(result.ocr_text),
        }
    } else {
        let format = SheetFormat::from_file_name(&file.name);
        let bytes = file.bytes;
        let extraction = spawn_blocking(move || import_spreadsheet(&bytes, format)).await??;
        UploadResponse {
            message: "File processed successfully",
            filename: file.name,
            extraction,
            ocr_text: None,
        }
    };

    info!(records = response.extraction.records.len(), "upload parsed");
    Ok(Json(response))
}

// ── Generate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    start_receipt_number: Option<u64>,
}

fn parse_generate_request(body: &[u8]) -> Result<(Vec<EmployeeRecord>, u64), ApiError> {
    let request: GenerateRequest = serde_json::from_slice(body).map_err(|_| ApiError::InvalidData)?;
    let records = match request.data {
        Some(data @ Value::Array(_)) => {
            serde_json::from_value(data).map_err(|_| ApiError::InvalidData)?
        }
        _ => return Err(ApiError::InvalidData),
    };
    Ok((records, request.start_receipt_number.unwrap_or(1)))
}

/// Renders the reviewed records and returns them as a ZIP download.
pub async fn generate(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let (records, start) = parse_generate_request(&body)?;
    let options = state.receipt.clone();
    let issued_on = Local::now().date_naive();

    let batch =
        spawn_blocking(move || generate_receipts(&records, start, issued_on, &options)).await??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_NAME}\""),
            ),
        ],
        batch.archive,
    )
        .into_response())
}
