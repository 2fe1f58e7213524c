//! Named value transforms applied by mapping rules.

use std::fmt;
use std::str::FromStr;

use mpi_model::{CanonicalField, PATIENT_KEY_DIGITS, Sex};
use mpi_normalization::{
    digits_only, extract_digits, normalize, normalize_sex, token, tokens_after_first,
};

/// Digits kept when parsing an age.
const AGE_DIGITS: usize = 3;

/// A value transform, resolved from its configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Trim surrounding whitespace, keep the text otherwise untouched.
    Trim,
    Normalize,
    /// Leading digits parsed as an integer, capped at `max_len` digits.
    Digits { max_len: usize },
    Sex,
    /// Digits only, kept as text so leading zeros survive.
    Phone,
    FirstToken,
    SecondToken,
    AfterFirstToken,
}

/// Shape of the value a transform produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Sex,
}

/// Output of a transform for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedValue {
    Text(String),
    Integer(u64),
    Sex(Sex),
    Null,
}

impl Transform {
    pub const NAMES: [&'static str; 9] = [
        "trim",
        "normalize",
        "digits",
        "integer",
        "sex",
        "phone",
        "first_token",
        "second_token",
        "after_first_token",
    ];

    /// Parses an optional configuration name; `None` and `"none"` mean "use the field default".
    pub fn parse_optional(name: Option<&str>) -> Result<Option<Self>, String> {
        match name.map(str::trim) {
            None => Ok(None),
            Some(value) if value.is_empty() || value.eq_ignore_ascii_case("none") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }

    /// Transform used when a rule does not name one.
    pub fn default_for(field: CanonicalField) -> Self {
        match field {
            CanonicalField::PatientKey => Self::Digits {
                max_len: PATIENT_KEY_DIGITS,
            },
            CanonicalField::Age => Self::Digits {
                max_len: AGE_DIGITS,
            },
            CanonicalField::Sex => Self::Sex,
            CanonicalField::Phone => Self::Phone,
            CanonicalField::GivenName
            | CanonicalField::FamilyName
            | CanonicalField::MaternalFamilyName
            | CanonicalField::Address => Self::Normalize,
            CanonicalField::NationalId => Self::Trim,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Trim => "trim",
            Self::Normalize => "normalize",
            Self::Digits { max_len } if max_len == AGE_DIGITS => "integer",
            Self::Digits { .. } => "digits",
            Self::Sex => "sex",
            Self::Phone => "phone",
            Self::FirstToken => "first_token",
            Self::SecondToken => "second_token",
            Self::AfterFirstToken => "after_first_token",
        }
    }

    pub fn output_kind(self) -> ValueKind {
        match self {
            Self::Digits { .. } => ValueKind::Integer,
            Self::Sex => ValueKind::Sex,
            _ => ValueKind::Text,
        }
    }

    /// Whether this transform can populate `field`.
    pub fn fits(self, field: CanonicalField) -> bool {
        let wanted = match field {
            CanonicalField::PatientKey | CanonicalField::Age => ValueKind::Integer,
            CanonicalField::Sex => ValueKind::Sex,
            _ => ValueKind::Text,
        };
        if self.output_kind() != wanted {
            return false;
        }
        match (field, self) {
            (CanonicalField::PatientKey, Self::Digits { max_len }) => max_len <= PATIENT_KEY_DIGITS,
            // Names are always stored upper-cased and unaccented.
            (
                CanonicalField::GivenName
                | CanonicalField::FamilyName
                | CanonicalField::MaternalFamilyName,
                Self::Trim | Self::Phone,
            ) => false,
            _ => true,
        }
    }

    /// Applies the transform to one cell. Total: bad input yields [`MappedValue::Null`].
    pub fn apply(self, value: Option<&str>) -> MappedValue {
        let text = |value: Option<String>| value.map_or(MappedValue::Null, MappedValue::Text);
        match self {
            Self::Trim => text(
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            ),
            Self::Normalize => text(normalize(value)),
            Self::Digits { max_len } => {
                extract_digits(value, max_len).map_or(MappedValue::Null, MappedValue::Integer)
            }
            Self::Sex => normalize_sex(value).map_or(MappedValue::Null, MappedValue::Sex),
            Self::Phone => text(digits_only(value)),
            Self::FirstToken => text(token(value, 0)),
            Self::SecondToken => text(token(value, 1)),
            Self::AfterFirstToken => text(tokens_after_first(value)),
        }
    }
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let transform = match value.trim().to_ascii_lowercase().as_str() {
            "trim" => Self::Trim,
            "normalize" => Self::Normalize,
            "digits" => Self::Digits {
                max_len: PATIENT_KEY_DIGITS,
            },
            "integer" => Self::Digits {
                max_len: AGE_DIGITS,
            },
            "sex" => Self::Sex,
            "phone" => Self::Phone,
            "first_token" => Self::FirstToken,
            "second_token" => Self::SecondToken,
            "after_first_token" => Self::AfterFirstToken,
            _ => return Err(value.to_string()),
        };
        Ok(transform)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
