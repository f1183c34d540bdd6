use std::collections::HashSet;
use std::io::{Cursor, Write};

use chrono::NaiveDate;
use recibos_core::{long_date_pt, EmployeeRecord};
use thiserror::Error;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::render::{render_pdf, RenderError};
use crate::template::{ReceiptDocument, ReceiptOptions};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No employee data provided")]
    NoRecords,
    #[error("No PDFs were generated. Please check if employee data has valid names.")]
    NoValidRecords,
    #[error("Receipt numbers starting at {start} run past the largest supported number")]
    NumberOverflow { start: u64 },
    #[error("Failed to render receipt {number} for {name}: {source}")]
    Render {
        number: u64,
        name: String,
        #[source]
        source: RenderError,
    },
    #[error("Failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished ZIP of receipts.
#[derive(Debug)]
pub struct ReceiptBatch {
    pub archive: Vec<u8>,
    /// Entry names in archive order.
    pub entries: Vec<String>,
    pub first_number: u64,
    pub last_number: u64,
}

impl ReceiptBatch {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// `Recibo - <name> - <long date>.pdf`, with path separators replaced so the
/// entry stays at the archive root.
pub fn receipt_file_name(name: &str, issued_on: NaiveDate) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    format!("Recibo - {} - {}.pdf", safe, long_date_pt(issued_on))
}

fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let stem = base.strip_suffix(".pdf").unwrap_or(&base);
    let mut n = 2;
    loop {
        let candidate = format!("{stem} ({n}).pdf");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Renders one receipt per named record, numbered consecutively from
/// `start_number`, and packs them into a ZIP archive.
///
/// Records without a name are skipped and do not consume a number. A batch
/// that would need a number past `u64::MAX` fails before anything is returned.
pub fn generate_receipts(
    records: &[EmployeeRecord],
    start_number: u64,
    issued_on: NaiveDate,
    options: &ReceiptOptions,
) -> Result<ReceiptBatch, BatchError> {
    if records.is_empty() {
        return Err(BatchError::NoRecords);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();
    let mut entries = Vec::new();
    let mut next = Some(start_number);
    let mut last_number = start_number;

    for (index, record) in records.iter().enumerate() {
        if !record.has_name() {
            warn!(index, "skipping record without a name");
            continue;
        }
        let number = next.ok_or(BatchError::NumberOverflow { start: start_number })?;

        let doc = ReceiptDocument::new(record, number, issued_on, options);
        let pdf = render_pdf(&doc).map_err(|source| BatchError::Render {
            number,
            name: doc.customer.clone(),
            source,
        })?;

        let entry = unique_name(receipt_file_name(&record.name, issued_on), &mut used);
        zip.start_file(entry.as_str(), file_options)?;
        zip.write_all(&pdf)?;
        debug!(number, entry = %entry, bytes = pdf.len(), "receipt added");

        entries.push(entry);
        last_number = number;
        next = number.checked_add(1);
    }

    if entries.is_empty() {
        return Err(BatchError::NoValidRecords);
    }

    let archive = zip.finish()?.into_inner();
    let batch = ReceiptBatch {
        archive,
        first_number: start_number,
        last_number,
        entries,
    };
    info!(
        count = batch.count(),
        first = batch.first_number,
        last = batch.last_number,
        "receipt batch generated"
    );
    Ok(batch)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Content;
    use lopdf::{Document, Object};
    use recibos_core::FieldValue;
    use rust_decimal::Decimal;
    use std::io::Read;
    use zip::ZipArchive;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn paid(name: &str, total: i64) -> EmployeeRecord {
        let mut r = EmployeeRecord::named(name);
        r.base_salary = Some(FieldValue::Number(Decimal::from(total)));
        r.total = Some(FieldValue::Number(Decimal::from(total)));
        r
    }

    fn open(batch: &ReceiptBatch) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(batch.archive.clone())).unwrap()
    }

    /// The value printed after `Recibo nº:` in each entry, in archive order.
    fn printed_numbers(batch: &ReceiptBatch) -> Vec<String> {
        let mut zip = open(batch);
        batch
            .entries
            .iter()
            .map(|entry| {
                let mut pdf = Vec::new();
                zip.by_name(entry).unwrap().read_to_end(&mut pdf).unwrap();
                let doc = Document::load_mem(&pdf).unwrap();
                let page = *doc.get_pages().values().next().unwrap();
                let content = Content::decode(&doc.get_page_content(page).unwrap()).unwrap();
                let texts: Vec<Vec<u8>> = content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(bytes, _)) => Some(bytes.clone()),
                        _ => None,
                    })
                    .collect();
                let label = texts
                    .iter()
                    .position(|t| t.as_slice() == b"Recibo n\xBA:")
                    .unwrap();
                String::from_utf8(texts[label + 1].clone()).unwrap()
            })
            .collect()
    }

    #[test]
    fn one_entry_per_named_record() {
        let records = vec![paid("Ana", 100), paid("Bruno", 200), paid("Carla", 300)];
        let batch = generate_receipts(&records, 10, day(), &ReceiptOptions::default()).unwrap();
        assert_eq!(batch.count(), 3);
        assert_eq!((batch.first_number, batch.last_number), (10, 12));
        assert_eq!(printed_numbers(&batch), vec!["10", "11", "12"]);

        let mut zip = open(&batch);
        assert_eq!(zip.len(), 3);
        let mut names: Vec<_> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names[0], "Recibo - Ana - 5 de janeiro de 2024.pdf");

        let mut pdf = Vec::new();
        zip.by_name("Recibo - Bruno - 5 de janeiro de 2024.pdf")
            .unwrap()
            .read_to_end(&mut pdf)
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn unnamed_records_are_skipped_without_consuming_numbers() {
        let records = vec![paid("Ana", 100), paid("  ", 50), paid("Bruno", 200)];
        let batch = generate_receipts(&records, 1, day(), &ReceiptOptions::default()).unwrap();
        assert_eq!(batch.count(), 2);
        assert_eq!(batch.last_number, 2);
        assert_eq!(printed_numbers(&batch), vec!["1", "2"]);
        assert_eq!(
            batch.entries,
            vec![
                "Recibo - Ana - 5 de janeiro de 2024.pdf",
                "Recibo - Bruno - 5 de janeiro de 2024.pdf",
            ]
        );
    }

    #[test]
    fn skipped_records_in_the_middle_keep_numbers_consecutive() {
        let records = vec![
            EmployeeRecord::default(),
            paid("Ana", 100),
            paid("", 1),
            paid("Bruno", 200),
            EmployeeRecord::default(),
            paid("Carla", 300),
        ];
        let batch = generate_receipts(&records, 41, day(), &ReceiptOptions::default()).unwrap();
        assert_eq!(printed_numbers(&batch), vec!["41", "42", "43"]);
        assert_eq!(batch.last_number, 43);
    }

    #[test]
    fn last_possible_number_fits_one_receipt() {
        let batch =
            generate_receipts(&[paid("Ana", 1)], u64::MAX, day(), &ReceiptOptions::default()).unwrap();
        assert_eq!((batch.first_number, batch.last_number), (u64::MAX, u64::MAX));
        assert_eq!(printed_numbers(&batch), vec![u64::MAX.to_string()]);
    }

    #[test]
    fn numbering_past_the_maximum_is_rejected() {
        let records = vec![paid("Ana", 1), paid("", 2), paid("Bruno", 3)];
        let err =
            generate_receipts(&records, u64::MAX, day(), &ReceiptOptions::default()).unwrap_err();
        assert!(matches!(err, BatchError::NumberOverflow { start: u64::MAX }));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            generate_receipts(&[], 1, day(), &ReceiptOptions::default()),
            Err(BatchError::NoRecords)
        ));
    }

    #[test]
    fn all_unnamed_is_rejected() {
        let records = vec![EmployeeRecord::default(), paid("", 10)];
        let err = generate_receipts(&records, 1, day(), &ReceiptOptions::default()).unwrap_err();
        assert!(matches!(err, BatchError::NoValidRecords));
        assert!(err.to_string().starts_with("No PDFs were generated"));
    }

    #[test]
    fn duplicate_names_get_distinct_entries() {
        let records = vec![paid("Ana", 100), paid("Ana", 200), paid("Ana", 300)];
        let batch = generate_receipts(&records, 1, day(), &ReceiptOptions::default()).unwrap();
        assert_eq!(
            batch.entries,
            vec![
                "Recibo - Ana - 5 de janeiro de 2024.pdf",
                "Recibo - Ana - 5 de janeiro de 2024 (2).pdf",
                "Recibo - Ana - 5 de janeiro de 2024 (3).pdf",
            ]
        );
        assert_eq!(open(&batch).len(), 3);
    }

    #[test]
    fn start_number_zero_is_honored() {
        let batch = generate_receipts(&[paid("Ana", 1)], 0, day(), &ReceiptOptions::default()).unwrap();
        assert_eq!((batch.first_number, batch.last_number), (0, 0));
    }

    #[test]
    fn file_name_sanitizes_separators() {
        assert_eq!(
            receipt_file_name(" Ana/Maria\\Souza ", day()),
            "Recibo - Ana-Maria-Souza - 5 de janeiro de 2024.pdf"
        );
    }
}
