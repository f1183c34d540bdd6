use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::record::FieldValue;

/// A payroll amount. Displays in the receipt currency format: `$ 1234.50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    /// `None` when the sum leaves the `Decimal` range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$ {:.2}", self.0.round_dp(2))
    }
}

/// Formats an optional amount. Missing values and text that is not a number
/// render as `$ 0.00`.
pub fn format_currency(value: Option<&FieldValue>) -> String {
    value
        .and_then(FieldValue::as_decimal)
        .map(Money::from_decimal)
        .unwrap_or_default()
        .to_string()
}

/// Lenient decimal parse of a spreadsheet or request value: plain decimal
/// notation first, then scientific (`1e3`). Blank input is not a number.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn display_two_decimals() {
        assert_eq!(Money::from_decimal(Decimal::new(113000, 2)).to_string(), "$ 1130.00");
        assert_eq!(Money::from_decimal(Decimal::new(5, 1)).to_string(), "$ 0.50");
        assert_eq!(Money::default().to_string(), "$ 0.00");
    }

    #[test]
    fn display_rounds_extra_places() {
        assert_eq!(Money::from_decimal(Decimal::new(12345, 3)).to_string(), "$ 12.34");
        assert_eq!(Money::from_decimal(Decimal::new(12355, 3)).to_string(), "$ 12.36");
    }

    #[test]
    fn checked_arithmetic() {
        let a = Money::from_decimal(Decimal::from(100));
        let b = Money::from_decimal(Decimal::from(20));
        assert_eq!(a.checked_sub(b).map(Money::amount), Some(Decimal::from(80)));
        assert_eq!(a.checked_add(b).map(Money::amount), Some(Decimal::from(120)));
    }

    #[test]
    fn checked_arithmetic_overflow() {
        let max = Money::from_decimal(Decimal::MAX);
        let min = Money::from_decimal(Decimal::MIN);
        assert_eq!(max.checked_add(max), None);
        assert_eq!(min.checked_sub(max), None);
    }

    #[test]
    fn format_currency_missing_is_zero() {
        assert_eq!(format_currency(None), "$ 0.00");
    }

    #[test]
    fn format_currency_text_is_zero_not_nan() {
        let v = FieldValue::Text("a combinar".into());
        assert_eq!(format_currency(Some(&v)), "$ 0.00");
    }

    #[test]
    fn format_currency_numeric_text() {
        let v = FieldValue::Text(" 250.5 ".into());
        assert_eq!(format_currency(Some(&v)), "$ 250.50");
    }

    #[test]
    fn parse_decimal_variants() {
        assert_eq!(parse_decimal("1000"), Some(Decimal::from(1000)));
        assert_eq!(parse_decimal(" -20.5 "), Some(Decimal::new(-205, 1)));
        assert_eq!(parse_decimal("+7"), Some(Decimal::from(7)));
        assert_eq!(parse_decimal("1e3"), Some(Decimal::from(1000)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("R$ 10"), None);
        assert_eq!(parse_decimal("abc"), None);
    }
}
