pub mod batch;
pub mod render;
pub mod template;

pub use batch::{generate_receipts, receipt_file_name, BatchError, ReceiptBatch};
pub use render::{render_pdf, RenderError};
pub use template::{LineItem, LineStyle, ReceiptDocument, ReceiptOptions};
