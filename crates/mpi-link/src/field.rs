//! Record attributes addressable by blocking keys and comparators.

use std::fmt;
use std::str::FromStr;

use mpi_model::{CanonicalField, CanonicalPatientRecord};
use mpi_normalization::normalize;

/// A canonical field, or the derived full name (given + family).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareField {
    Field(CanonicalField),
    FullName,
}

impl CompareField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Field(field) => field.as_str(),
            Self::FullName => "full_name",
        }
    }

    /// Normalized text of the attribute; `None` when missing or blank.
    pub fn text(self, record: &CanonicalPatientRecord) -> Option<String> {
        let raw = match self {
            Self::Field(field) => record.field_text(field),
            Self::FullName => record.full_name(),
        };
        normalize(raw.as_deref())
    }

    /// Numeric value of the attribute; `None` when missing or not a number.
    pub fn number(self, record: &CanonicalPatientRecord) -> Option<f64> {
        match self {
            Self::Field(CanonicalField::Age) => record.age.map(f64::from),
            Self::Field(CanonicalField::PatientKey) => Some(f64::from(record.patient_key.get())),
            _ => self
                .text(record)?
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
        }
    }
}

impl From<CanonicalField> for CompareField {
    fn from(field: CanonicalField) -> Self {
        Self::Field(field)
    }
}

impl fmt::Display for CompareField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompareField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("full_name") {
            return Ok(Self::FullName);
        }
        value.parse::<CanonicalField>().map(Self::Field)
    }
}
