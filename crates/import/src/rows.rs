use recibos_core::{parse_decimal, ColumnMapping, EmployeeRecord, Field, FieldValue};

/// A raw spreadsheet cell, before any field meaning is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// The cell as text, the way it reads in the sheet. Numbers use their
    /// shortest form (`1000`, `12.5`).
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Coerces the cell for a non-name field: anything that reads as a number
    /// becomes one, other text is kept verbatim.
    fn to_value(&self) -> Option<FieldValue> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(
                parse_decimal(&n.to_string())
                    .map(FieldValue::Number)
                    .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            ),
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(
                parse_decimal(s)
                    .map(FieldValue::Number)
                    .unwrap_or_else(|| FieldValue::Text(s.clone())),
            ),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Builds the canonical record for one data row.
///
/// Returns `None` for rows with no content and for rows whose mapped name
/// cell is blank. When the row has a base salary but no total, the total is
/// derived from the other amounts.
pub fn normalize_row(row: &[Cell], mapping: &ColumnMapping) -> Option<EmployeeRecord> {
    if row.iter().all(Cell::is_empty) {
        return None;
    }

    let mut record = EmployeeRecord::default();

    for (field, column) in mapping.detected() {
        let Some(cell) = column.index.and_then(|i| row.get(i)) else {
            continue;
        };
        if cell.is_empty() {
            continue;
        }
        if field == Field::Name {
            record.set(field, FieldValue::Text(cell.as_text()));
        } else if let Some(value) = cell.to_value() {
            record.set(field, value);
        }
    }

    if record.total.is_none() && record.base_salary.is_some() {
        record.derive_total();
    }

    record.has_name().then_some(record)
}
