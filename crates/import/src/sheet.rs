use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use thiserror::Error;

use crate::rows::Cell;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Could not open workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Workbook has no sheets")]
    NoSheets,
    #[error("Spreadsheet is empty")]
    Empty,
}

/// How the uploaded bytes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// xlsx / xlsm / xlsb / xls / ods, sniffed by calamine.
    Workbook,
    Csv,
}

impl SheetFormat {
    /// Picks the decoder from a file name. Anything that is not `.csv` is
    /// handed to the workbook reader.
    pub fn from_file_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => SheetFormat::Csv,
            _ => SheetFormat::Workbook,
        }
    }
}

/// First sheet of a file: the header row and the data rows below it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Decodes the first sheet. A sheet with no rows at all is an error; a
/// header-only sheet is not.
pub fn read_sheet(data: &[u8], format: SheetFormat) -> Result<RawSheet, ImportError> {
    let mut rows = match format {
        SheetFormat::Workbook => read_workbook(data)?,
        SheetFormat::Csv => read_csv(data)?,
    };

    if rows.is_empty() {
        return Err(ImportError::Empty);
    }

    let headers = rows.remove(0).iter().map(Cell::as_text).collect();
    Ok(RawSheet { headers, rows })
}

fn read_workbook(data: &[u8]) -> Result<Vec<Vec<Cell>>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;
    let range = workbook.worksheet_range_at(0).ok_or(ImportError::NoSheets)??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

fn read_csv(data: &[u8]) -> Result<Vec<Vec<Cell>>, ImportError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(data))
        .from_reader(data);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|s| if s.is_empty() { Cell::Empty } else { Cell::Text(s.to_string()) })
                .collect(),
        );
    }
    Ok(rows)
}

/// Spreadsheet programs in pt-BR locales export CSV with `;`.
fn sniff_delimiter(data: &[u8]) -> u8 {
    let first_line = data.split(|&b| b == b'\n').next().unwrap_or_default();
    let count = |needle: u8| first_line.iter().filter(|&&b| b == needle).count();
    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}
