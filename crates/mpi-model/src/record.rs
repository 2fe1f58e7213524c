//! Canonical (federated) patient record and its deterministic identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{PatientKey, SourceSystem};

/// Target fields of the federated patient schema.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    PatientKey,
    GivenName,
    FamilyName,
    MaternalFamilyName,
    Address,
    NationalId,
    Age,
    Sex,
    Phone,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 9] = [
        Self::PatientKey,
        Self::GivenName,
        Self::FamilyName,
        Self::MaternalFamilyName,
        Self::Address,
        Self::NationalId,
        Self::Age,
        Self::Sex,
        Self::Phone,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PatientKey => "patient_key",
            Self::GivenName => "given_name",
            Self::FamilyName => "family_name",
            Self::MaternalFamilyName => "maternal_family_name",
            Self::Address => "address",
            Self::NationalId => "national_id",
            Self::Age => "age",
            Self::Sex => "sex",
            Self::Phone => "phone",
        }
    }

    /// Every field except the patient key may be left empty.
    pub fn is_optional(self) -> bool {
        !matches!(self, Self::PatientKey)
    }

    /// Optional fields, in schema order.
    pub fn optional_fields() -> impl Iterator<Item = CanonicalField> {
        Self::ALL.into_iter().filter(|field| field.is_optional())
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| value.to_string())
    }
}

/// Declared sex/gender as reported by the source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A patient record in the shared federated shape.
///
/// `patient_key` is always present; records without one never reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPatientRecord {
    pub patient_key: PatientKey,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub maternal_family_name: Option<String>,
    pub address: Option<String>,
    pub national_id: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub phone: Option<String>,
    pub source_system: SourceSystem,
}

impl CanonicalPatientRecord {
    pub fn new(patient_key: PatientKey, source_system: SourceSystem) -> Self {
        Self {
            patient_key,
            given_name: None,
            family_name: None,
            maternal_family_name: None,
            address: None,
            national_id: None,
            age: None,
            sex: None,
            phone: None,
            source_system,
        }
    }

    pub fn composite_key(&self) -> CompositeKey {
        CompositeKey {
            patient_key: self.patient_key,
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
        }
    }

    /// Given and family name joined by a single space, if either is present.
    pub fn full_name(&self) -> Option<String> {
        match (self.given_name.as_deref(), self.family_name.as_deref()) {
            (Some(given), Some(family)) => Some(format!("{given} {family}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }

    /// Text rendering of a field, `None` when the field is empty.
    pub fn field_text(&self, field: CanonicalField) -> Option<String> {
        match field {
            CanonicalField::PatientKey => Some(self.patient_key.to_string()),
            CanonicalField::GivenName => self.given_name.clone(),
            CanonicalField::FamilyName => self.family_name.clone(),
            CanonicalField::MaternalFamilyName => self.maternal_family_name.clone(),
            CanonicalField::Address => self.address.clone(),
            CanonicalField::NationalId => self.national_id.clone(),
            CanonicalField::Age => self.age.map(|age| age.to_string()),
            CanonicalField::Sex => self.sex.map(|sex| sex.code().to_string()),
            CanonicalField::Phone => self.phone.clone(),
        }
    }

    pub fn is_empty(&self, field: CanonicalField) -> bool {
        self.field_text(field)
            .is_none_or(|value| value.trim().is_empty())
    }
}

/// Exact-match identity used by the deterministic deduplicator.
///
/// Source system is deliberately not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompositeKey {
    pub patient_key: PatientKey,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.patient_key,
            self.given_name.as_deref().unwrap_or(""),
            self.family_name.as_deref().unwrap_or("")
        )
    }
}
