use std::sync::OnceLock;

use recibos_core::{ColumnMapping, DetectedColumn, Field};
use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_name, r"(?i)(nome|name|funcion[aá]rio|employee|colaborador)");
re!(re_day_shifts, r"(?i)(dias?\s*diurnos?|day\s*shifts?|diurno)");
re!(re_night_shifts, r"(?i)(dias?\s*noturnos?|night\s*shifts?|noturno)");
re!(re_base_salary, r"(?i)(sal[aá]rio\s*base|base\s*salary)");
re!(re_benefits, r"(?i)(benef[ií]cios?)");
re!(re_bonus, r"(?i)(b[oô]nus\s*de?\s*5%?|bonus\s*5%?)");
re!(re_deductions, r"(?i)(descontos?|discounts?)");
re!(re_total, r"(?i)(total)");

/// Header rules in priority order. Each field keeps the first header that
/// matches it.
const RULES: [(Field, fn() -> &'static Regex); 8] = [
    (Field::Name, re_name),
    (Field::DayShifts, re_day_shifts),
    (Field::NightShifts, re_night_shifts),
    (Field::BaseSalary, re_base_salary),
    (Field::Benefits, re_benefits),
    (Field::Bonus, re_bonus),
    (Field::Deductions, re_deductions),
    (Field::Total, re_total),
];

/// Fields a spreadsheet header can be detected for.
pub fn detectable_fields() -> [Field; 8] {
    RULES.map(|(field, _)| field)
}

/// Maps canonical fields to the spreadsheet headers that name them.
///
/// Headers are scanned in order and trimmed before matching; the label kept
/// in the mapping is the header as written. One header may satisfy several
/// fields. Fields without a matching header stay unmapped.
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    let mut mapping = ColumnMapping::unmapped(&detectable_fields());

    for (index, header) in headers.iter().enumerate() {
        let header = header.as_ref();
        let clean = header.trim();
        if clean.is_empty() {
            continue;
        }
        for (field, pattern) in RULES {
            if !mapping.is_mapped(field) && pattern().is_match(clean) {
                mapping.set(field, DetectedColumn::at(header, index));
            }
        }
    }

    mapping
}
