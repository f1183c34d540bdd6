pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use extract::{parse_number, PayrollTextExtractor};
pub use pipeline::{ImagePipeline, OcrResult, PipelineError, UNREADABLE_IMAGE};
pub use preprocess::{prepare_for_ocr, PreprocessError, DEFAULT_MAX_SIDE};
pub use recognizer::{DisabledRecognizer, MockRecognizer, OcrBackend, OcrError, DEFAULT_LANGUAGE};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
