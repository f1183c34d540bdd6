use chrono::NaiveDate;
use recibos_core::{format_currency, long_date_pt, EmployeeRecord, Field};
use serde::{Deserialize, Serialize};

/// Fixed wording that varies per business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptOptions {
    pub title: String,
    /// Printed as `Condições de pagamento: …`.
    pub payment_terms: String,
}

impl Default for ReceiptOptions {
    fn default() -> Self {
        Self {
            title: "Recibo".to_string(),
            payment_terms: "Binance".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Normal,
    /// Drawn in red, value prefixed with `-`.
    Deduction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub label: &'static str,
    pub value: String,
    pub style: LineStyle,
}

/// Counts print as plain numbers, the rest as currency.
const ITEM_FIELDS: [(Field, bool); 7] = [
    (Field::DayShifts, false),
    (Field::NightShifts, false),
    (Field::BaseSalary, true),
    (Field::Benefits, true),
    (Field::Bonus, true),
    (Field::Health, true),
    (Field::Deductions, true),
];

/// Everything printed on one receipt, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDocument {
    pub title: String,
    pub number: u64,
    pub date: String,
    pub customer: String,
    pub items: Vec<LineItem>,
    pub total: String,
    pub payment_terms: String,
}

impl ReceiptDocument {
    pub fn new(
        record: &EmployeeRecord,
        number: u64,
        issued_on: NaiveDate,
        options: &ReceiptOptions,
    ) -> Self {
        let items = ITEM_FIELDS
            .into_iter()
            .filter_map(|(field, currency)| {
                let value = record.value(field).filter(|v| !v.is_zero())?;
                let (value, style) = match (field, currency) {
                    (Field::Deductions, _) => {
                        (format!("-{}", format_currency(Some(value))), LineStyle::Deduction)
                    }
                    (_, true) => (format_currency(Some(value)), LineStyle::Normal),
                    (_, false) => (value.to_string(), LineStyle::Normal),
                };
                Some(LineItem { label: field.label(), value, style })
            })
            .collect();

        let customer = match record.name.trim() {
            "" => "N/A".to_string(),
            name => name.to_string(),
        };

        Self {
            title: options.title.clone(),
            number,
            date: long_date_pt(issued_on),
            customer,
            items,
            total: format_currency(record.total.as_ref()),
            payment_terms: options.payment_terms.clone(),
        }
    }

    /// `(label, value)` pairs under the title.
    pub fn info_lines(&self) -> [(&'static str, String); 3] {
        [
            ("Recibo nº:", self.number.to_string()),
            ("Data:", self.date.clone()),
            ("Cliente:", self.customer.clone()),
        ]
    }

    pub fn confirmation(&self) -> String {
        format!(
            "Confirmamos o recebimento total dos produtos/serviços Valor Total: {} descritos nesse recibo.",
            self.total
        )
    }

    pub fn final_value(&self) -> String {
        format!("Valor Final: {}", self.total)
    }

    pub fn payment_condition(&self) -> String {
        format!("Condições de pagamento: {}", self.payment_terms)
    }
}
