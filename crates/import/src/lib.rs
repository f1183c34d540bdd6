pub mod columns;
pub mod rows;
pub mod sheet;

pub use columns::{detect_columns, detectable_fields};
pub use rows::{normalize_row, Cell};
pub use sheet::{read_sheet, ImportError, RawSheet, SheetFormat};

use std::path::Path;

use recibos_core::PayrollExtraction;
use tracing::debug;

/// Reads the first sheet, detects the payroll columns from its header row
/// and normalizes every data row that names an employee.
pub fn import_spreadsheet(data: &[u8], format: SheetFormat) -> Result<PayrollExtraction, ImportError> {
    let RawSheet { headers, rows } = read_sheet(data, format)?;
    let mapping = detect_columns(&headers);

    debug!(?headers, rows = rows.len(), "spreadsheet decoded");
    for (field, column) in mapping.detected() {
        debug!(%field, header = %column.header, index = ?column.index, "column detected");
    }
    if !mapping.missing().is_empty() {
        debug!(missing = ?mapping.missing(), "columns not found");
    }

    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| normalize_row(row, &mapping))
        .collect();

    debug!(records = records.len(), skipped = rows.len() - records.len(), "rows normalized");

    Ok(PayrollExtraction { headers, mapping, records })
}

/// [`import_spreadsheet`] for a file on disk, with the format taken from its
/// extension.
pub fn import_path(path: &Path) -> Result<PayrollExtraction, ImportError> {
    let data = std::fs::read(path)?;
    let format = SheetFormat::from_file_name(&path.to_string_lossy());
    import_spreadsheet(&data, format)
}
