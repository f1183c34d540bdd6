use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::record::{EmployeeRecord, Field};

/// Where a canonical field was found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedColumn {
    /// The source label as it appeared (spreadsheet header or a synthetic
    /// description for OCR).
    pub header: String,
    /// Column position. OCR detections have no column.
    pub index: Option<usize>,
}

impl DetectedColumn {
    pub fn at(header: impl Into<String>, index: usize) -> Self {
        Self { header: header.into(), index: Some(index) }
    }

    pub fn synthetic(header: impl Into<String>) -> Self {
        Self { header: header.into(), index: None }
    }
}

/// Field → detected source column. Every field starts unmapped; staying
/// unmapped is a valid outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    entries: Vec<(Field, Option<DetectedColumn>)>,
}

impl ColumnMapping {
    pub fn unmapped(fields: &[Field]) -> Self {
        Self { entries: fields.iter().map(|&f| (f, None)).collect() }
    }

    pub fn get(&self, field: Field) -> Option<&DetectedColumn> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, c)| c.as_ref())
    }

    pub fn is_mapped(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Records a detection. Fields that are not part of this mapping are
    /// ignored.
    pub fn set(&mut self, field: Field, column: DetectedColumn) {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            *slot = Some(column);
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }

    pub fn detected(&self) -> impl Iterator<Item = (Field, &DetectedColumn)> {
        self.entries
            .iter()
            .filter_map(|(f, c)| c.as_ref().map(|c| (*f, c)))
    }

    /// Fields no source column was found for.
    pub fn missing(&self) -> Vec<Field> {
        self.entries
            .iter()
            .filter(|(_, c)| c.is_none())
            .map(|(f, _)| *f)
            .collect()
    }
}

impl Serialize for ColumnMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, column) in &self.entries {
            map.serialize_entry(field.key(), &column.as_ref().map(|c| c.header.as_str()))?;
        }
        map.end()
    }
}

/// Output of either extractor.
#[derive(Debug, Clone, Serialize)]
pub struct PayrollExtraction {
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    #[serde(rename = "data")]
    pub records: Vec<EmployeeRecord>,
}
