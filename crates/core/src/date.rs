use chrono::{Datelike, NaiveDate};

/// Month names used on receipts and archive entry names (pt-BR).
pub const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

pub fn month_name_pt(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTHS_PT.get(idx).copied()
}

/// `18 de outubro de 2026`. The day is not zero-padded.
pub fn long_date_pt(date: NaiveDate) -> String {
    // month() is always 1..=12
    let month = month_name_pt(date.month()).unwrap_or_default();
    format!("{} de {} de {}", date.day(), month, date.year())
}
