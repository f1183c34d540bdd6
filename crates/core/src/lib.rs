pub mod date;
pub mod mapping;
pub mod money;
pub mod record;

pub use date::{long_date_pt, month_name_pt, MONTHS_PT};
pub use mapping::{ColumnMapping, DetectedColumn, PayrollExtraction};
pub use money::{format_currency, parse_decimal, Money};
pub use record::{EmployeeRecord, Field, FieldValue};
