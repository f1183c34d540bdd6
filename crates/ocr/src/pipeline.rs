use std::path::Path;

use recibos_core::PayrollExtraction;
use thiserror::Error;
use tracing::debug;

use crate::extract::PayrollTextExtractor;
use crate::preprocess::{self, PreprocessError, DEFAULT_MAX_SIDE};
use crate::recognizer::{OcrBackend, OcrError};

/// Message shown to users for every image that could not be read.
pub const UNREADABLE_IMAGE: &str =
    "Failed to process image. Please ensure the image contains clear, readable text.";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not read image: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("could not read image: {0}")]
    Ocr(#[from] OcrError),
}

impl PipelineError {
    /// The single user-facing wording for a failed recognition. The detailed
    /// cause stays in `Display` for logs.
    pub fn user_message(&self) -> &'static str {
        UNREADABLE_IMAGE
    }
}

/// The result of reading one payroll photo.
#[derive(Debug)]
pub struct OcrResult {
    /// Raw recognized text.
    pub ocr_text: String,
    pub extraction: PayrollExtraction,
}

/// preprocess → recognize → extract.
pub struct ImagePipeline<R: OcrBackend> {
    recognizer: R,
    max_side: u32,
}

impl<R: OcrBackend> ImagePipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer, max_side: DEFAULT_MAX_SIDE }
    }

    pub fn with_max_side(mut self, max_side: u32) -> Self {
        self.max_side = max_side;
        self
    }

    pub fn process_file(&self, path: &Path) -> Result<OcrResult, PipelineError> {
        let bytes = std::fs::read(path)?;
        self.process_bytes(&bytes)
    }

    /// Reads an uploaded image. Any failure aborts the whole read; there are
    /// no partial results.
    pub fn process_bytes(&self, data: &[u8]) -> Result<OcrResult, PipelineError> {
        let image_bytes = preprocess::prepare_for_ocr(data, self.max_side)?;
        let ocr_text = self.recognizer.recognize(&image_bytes)?;
        debug!(chars = ocr_text.len(), lines = ocr_text.lines().count(), "text recognized");

        let extraction = PayrollTextExtractor::extract(&ocr_text);
        debug!(records = extraction.records.len(), "employees segmented");

        Ok(OcrResult { ocr_text, extraction })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
