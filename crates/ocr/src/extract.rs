use std::str::FromStr;
use std::sync::OnceLock;

use recibos_core::{ColumnMapping, DetectedColumn, EmployeeRecord, Field, FieldValue, PayrollExtraction};
use regex::Regex;
use rust_decimal::Decimal;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Two or more capitalized words at the start of a line.
re!(re_employee_name,
    r"^([A-ZÁÉÍÓÚÂÊÔÃÕÇ][a-záéíóúâêôãõç]+(?:\s+[A-ZÁÉÍÓÚÂÊÔÃÕÇ][a-záéíóúâêôãõç]+)+)");
re!(re_number, r"\d+[.,]?\d*");
re!(re_numeric_prefix, r"^[+-]?\d+(?:\.\d+)?");

/// Line keywords that say which amount a number is.
const KEYWORDS: [(Field, &[&str]); 4] = [
    (Field::BaseSalary, &["base", "salário", "salario"]),
    (Field::Benefits, &["extra", "adicional"]),
    (Field::Bonus, &["bonus", "bônus", "gratificação", "gratificacao"]),
    (Field::Health, &["saúde", "saude", "plano"]),
];

/// Column order assumed for a bare row of numbers.
const POSITIONAL: [Field; 4] = [Field::BaseSalary, Field::Benefits, Field::Bonus, Field::Health];

const OCR_HEADERS: [&str; 5] = ["Nome", "Salário Base", "Extra", "Bônus", "Saúde"];

const OCR_MAPPING: [(Field, &str); 5] = [
    (Field::Name, "Nome (detectado via OCR)"),
    (Field::BaseSalary, "Salário Base (detectado)"),
    (Field::Benefits, "Extra (detectado)"),
    (Field::Bonus, "Bônus (detectado)"),
    (Field::Health, "Saúde (detectado)"),
];

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct PayrollTextExtractor;

impl PayrollTextExtractor {
    /// Segments recognized text into employee records.
    ///
    /// A line that opens with a capitalized full name starts a new employee.
    /// Numbers on the following lines are assigned by keyword, or by position
    /// while the base salary is still unknown. Numbers seen before the first
    /// name are ignored.
    pub fn extract(ocr_text: &str) -> PayrollExtraction {
        let mut records = Vec::new();
        let mut current: Option<EmployeeRecord> = None;

        for line in ocr_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(name) = re_employee_name().captures(line).and_then(|c| c.get(1)) {
                records.extend(current.take().filter(EmployeeRecord::has_name));
                current = Some(EmployeeRecord::named(name.as_str()));
            }

            let Some(record) = current.as_mut() else {
                continue;
            };
            Self::assign_numbers(record, line);
        }
        records.extend(current.filter(EmployeeRecord::has_name));

        for record in &mut records {
            record.derive_total();
        }

        PayrollExtraction {
            headers: OCR_HEADERS.iter().map(|h| h.to_string()).collect(),
            mapping: Self::mapping(),
            records,
        }
    }

    fn assign_numbers(record: &mut EmployeeRecord, line: &str) {
        let numbers: Vec<&str> = re_number().find_iter(line).map(|m| m.as_str()).collect();
        let Some(first) = numbers.first() else {
            return;
        };

        let lower = line.to_lowercase();
        match classify(&lower) {
            Some(field) => record.set(field, FieldValue::Number(parse_number(first))),
            None if record.base_salary.is_none() => {
                for (field, n) in POSITIONAL.into_iter().zip(&numbers) {
                    record.set(field, FieldValue::Number(parse_number(n)));
                }
            }
            None => {}
        }
    }

    fn mapping() -> ColumnMapping {
        let fields = OCR_MAPPING.map(|(f, _)| f);
        let mut mapping = ColumnMapping::unmapped(&fields);
        for (field, label) in OCR_MAPPING {
            mapping.set(field, DetectedColumn::synthetic(label));
        }
        mapping
    }
}

fn classify(lower_line: &str) -> Option<Field> {
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower_line.contains(w)))
        .map(|(field, _)| *field)
}

// ── Number parsing ────────────────────────────────────────────────────────────

/// Reads an amount as printed on a payroll photo: `R$` and whitespace are
/// dropped, the first `,` is the decimal separator, and trailing garbage is
/// ignored. Unreadable text is zero.
pub fn parse_number(s: &str) -> Decimal {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, 'R' | '$') && !c.is_whitespace())
        .collect();
    let normalized = cleaned.replacen(',', ".", 1);
    re_numeric_prefix()
        .find(&normalized)
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
        .unwrap_or(Decimal::ZERO)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
