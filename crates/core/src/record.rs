use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::money::{parse_decimal, Money};

/// A cell value after coercion. Numbers stay numbers; anything that could not
/// be read as one is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(#[serde(with = "rust_decimal::serde::float")] Decimal),
    Text(String),
}

impl FieldValue {
    /// Numeric reading of the value. Text is parsed leniently.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => parse_decimal(s),
        }
    }

    /// Numeric reading used in totals: anything non-numeric counts as zero.
    pub fn amount(&self) -> Decimal {
        self.as_decimal().unwrap_or(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.as_decimal().is_some_and(|n| n.is_zero())
    }
}

impl From<Decimal> for FieldValue {
    fn from(n: Decimal) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n.normalize()),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Canonical payroll fields, in detection and rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "diasDiurnos")]
    DayShifts,
    #[serde(rename = "diasNoturnos")]
    NightShifts,
    #[serde(rename = "baseSalary")]
    BaseSalary,
    #[serde(rename = "beneficios")]
    Benefits,
    #[serde(rename = "bonus5")]
    Bonus,
    #[serde(rename = "descontos")]
    Deductions,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "total")]
    Total,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Name,
        Field::DayShifts,
        Field::NightShifts,
        Field::BaseSalary,
        Field::Benefits,
        Field::Bonus,
        Field::Deductions,
        Field::Health,
        Field::Total,
    ];

    /// Key used in JSON payloads and column mappings.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::DayShifts => "diasDiurnos",
            Field::NightShifts => "diasNoturnos",
            Field::BaseSalary => "baseSalary",
            Field::Benefits => "beneficios",
            Field::Bonus => "bonus5",
            Field::Deductions => "descontos",
            Field::Health => "health",
            Field::Total => "total",
        }
    }

    /// Line-item label printed on receipts.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Nome",
            Field::DayShifts => "Dias Diurnos",
            Field::NightShifts => "Dias Noturnos",
            Field::BaseSalary => "Salário Base",
            Field::Benefits => "Benefícios",
            Field::Bonus => "Bônus de 5%",
            Field::Deductions => "Descontos",
            Field::Health => "Plano de Saúde",
            Field::Total => "Total",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Field {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| format!("Unknown field: '{s}'"))
    }
}

/// One employee's payroll line, independent of where it was read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(rename = "diasDiurnos", default, skip_serializing_if = "Option::is_none")]
    pub day_shifts: Option<FieldValue>,
    #[serde(rename = "diasNoturnos", default, skip_serializing_if = "Option::is_none")]
    pub night_shifts: Option<FieldValue>,
    #[serde(rename = "baseSalary", default, skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<FieldValue>,
    #[serde(rename = "beneficios", default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<FieldValue>,
    #[serde(rename = "bonus5", default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<FieldValue>,
    #[serde(rename = "descontos", default, skip_serializing_if = "Option::is_none")]
    pub deductions: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<FieldValue>,
}

impl EmployeeRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Value of a non-name field. `Field::Name` has no `FieldValue` form.
    pub fn value(&self, field: Field) -> Option<&FieldValue> {
        match field {
            Field::Name => None,
            Field::DayShifts => self.day_shifts.as_ref(),
            Field::NightShifts => self.night_shifts.as_ref(),
            Field::BaseSalary => self.base_salary.as_ref(),
            Field::Benefits => self.benefits.as_ref(),
            Field::Bonus => self.bonus.as_ref(),
            Field::Deductions => self.deductions.as_ref(),
            Field::Health => self.health.as_ref(),
            Field::Total => self.total.as_ref(),
        }
    }

    pub fn set(&mut self, field: Field, value: FieldValue) {
        let slot = match field {
            Field::Name => {
                self.name = value.to_string().trim().to_string();
                return;
            }
            Field::DayShifts => &mut self.day_shifts,
            Field::NightShifts => &mut self.night_shifts,
            Field::BaseSalary => &mut self.base_salary,
            Field::Benefits => &mut self.benefits,
            Field::Bonus => &mut self.bonus,
            Field::Deductions => &mut self.deductions,
            Field::Health => &mut self.health,
            Field::Total => &mut self.total,
        };
        *slot = Some(value);
    }

    /// `baseSalary + beneficios + bonus5 + health - descontos`, absent or
    /// non-numeric terms counting as zero. `None` when the result does not
    /// fit in a `Decimal`.
    pub fn computed_total(&self) -> Option<Decimal> {
        let term = |v: &Option<FieldValue>| {
            Money::from_decimal(v.as_ref().map(FieldValue::amount).unwrap_or_default())
        };
        [&self.benefits, &self.bonus, &self.health]
            .into_iter()
            .try_fold(term(&self.base_salary), |acc, v| acc.checked_add(term(v)))?
            .checked_sub(term(&self.deductions))
            .map(Money::amount)
    }

    /// Fills `total` from the other amounts. A total that is already present
    /// is left untouched, and so is a total that would overflow.
    pub fn derive_total(&mut self) {
        if self.total.is_none() {
            self.total = self.computed_total().map(FieldValue::Number);
        }
    }
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FieldValue>::deserialize(deserializer)?;
    Ok(value.map(|v| v.to_string().trim().to_string()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn num(n: i64) -> FieldValue {
        FieldValue::Number(Decimal::from(n))
    }

    #[test]
    fn computed_total_spreadsheet_formula() {
        let mut r = EmployeeRecord::named("Ana");
        r.base_salary = Some(num(1000));
        r.benefits = Some(num(100));
        r.bonus = Some(num(50));
        r.deductions = Some(num(20));
        assert_eq!(r.computed_total(), Some(Decimal::from(1130)));
    }

    #[test]
    fn computed_total_missing_terms_are_zero() {
        let mut r = EmployeeRecord::named("Ana");
        r.base_salary = Some(num(1000));
        r.deductions = Some(FieldValue::Text("n/a".into()));
        assert_eq!(r.computed_total(), Some(Decimal::from(1000)));
    }

    #[test]
    fn computed_total_includes_health() {
        let mut r = EmployeeRecord::named("João Silva");
        r.base_salary = Some(num(1000));
        r.benefits = Some(num(150));
        r.bonus = Some(num(200));
        r.health = Some(num(50));
        assert_eq!(r.computed_total(), Some(Decimal::from(1400)));
    }

    #[test]
    fn derive_total_never_overwrites() {
        let mut r = EmployeeRecord::named("Ana");
        r.base_salary = Some(num(1000));
        r.total = Some(num(999));
        r.derive_total();
        assert_eq!(r.total, Some(num(999)));

        r.total = None;
        r.derive_total();
        assert_eq!(r.total, Some(num(1000)));
        r.base_salary = Some(num(5));
        r.derive_total();
        assert_eq!(r.total, Some(num(1000)));
    }

    #[test]
    fn overflowing_total_is_not_derived() {
        let mut r = EmployeeRecord::named("Ana");
        r.base_salary = Some(FieldValue::Number(Decimal::MAX));
        r.bonus = Some(FieldValue::Number(Decimal::MAX));
        assert_eq!(r.computed_total(), None);
        r.derive_total();
        assert_eq!(r.total, None);

        r.bonus = None;
        r.deductions = Some(FieldValue::Number(Decimal::MIN));
        assert_eq!(r.computed_total(), None);
    }

    #[test]
    fn has_name_rejects_blank() {
        assert!(EmployeeRecord::named("Ana").has_name());
        assert!(!EmployeeRecord::named("").has_name());
        assert!(!EmployeeRecord::named("   ").has_name());
    }

    #[test]
    fn set_and_value_cover_every_field() {
        let mut r = EmployeeRecord::default();
        for (i, field) in Field::ALL.into_iter().enumerate() {
            r.set(field, num(i as i64 + 1));
        }
        assert_eq!(r.name, "1");
        assert_eq!(r.value(Field::Name), None);
        for (i, field) in Field::ALL.into_iter().enumerate().skip(1) {
            assert_eq!(r.value(field), Some(&num(i as i64 + 1)), "{field}");
        }
    }

    #[test]
    fn field_key_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_str(field.key()).unwrap(), field);
        }
        assert!(Field::from_str("salary").is_err());
    }

    #[test]
    fn field_value_display() {
        assert_eq!(FieldValue::Number(Decimal::new(10000, 1)).to_string(), "1000");
        assert_eq!(FieldValue::Number(Decimal::new(125, 1)).to_string(), "12.5");
        assert_eq!(FieldValue::from("22 dias").to_string(), "22 dias");
    }

    #[test]
    fn field_value_is_zero() {
        assert!(num(0).is_zero());
        assert!(FieldValue::from("0.00").is_zero());
        assert!(!FieldValue::from("zero").is_zero());
        assert!(!num(3).is_zero());
    }

    #[test]
    fn json_shape_uses_canonical_keys() {
        let mut r = EmployeeRecord::named("Ana");
        r.base_salary = Some(num(1000));
        r.bonus = Some(num(50));
        r.day_shifts = Some(FieldValue::from("vinte"));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["name"], "Ana");
        assert_eq!(v["baseSalary"], 1000.0);
        assert_eq!(v["bonus5"], 50.0);
        assert_eq!(v["diasDiurnos"], "vinte");
        assert!(v.get("descontos").is_none());
        assert!(v.get("total").is_none());
    }

    #[test]
    fn json_input_is_lenient() {
        let r: EmployeeRecord = serde_json::from_str(
            r#"{"name": null, "baseSalary": 1000, "beneficios": "100", "descontos": null}"#,
        )
        .unwrap();
        assert_eq!(r.name, "");
        assert_eq!(r.base_salary, Some(num(1000)));
        assert_eq!(r.benefits.as_ref().map(FieldValue::amount), Some(Decimal::from(100)));
        assert_eq!(r.deductions, None);

        let r: EmployeeRecord = serde_json::from_str(r#"{"name": 42}"#).unwrap();
        assert_eq!(r.name, "42");

        let r: EmployeeRecord = serde_json::from_str(r#"{}"#).unwrap();
        assert!(!r.has_name());
    }
}
