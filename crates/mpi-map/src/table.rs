//! Per-source mapping tables.
//!
//! A table is declared as a list of [`MappingRuleConfig`] rows (usually read
//! from the federation TOML file) and validated once into a [`MappingTable`].
//! Validation is the only place configuration errors surface; a built table
//! can map any raw record without failing on configuration grounds.

use std::collections::BTreeSet;

use mpi_model::{CanonicalField, SourceSystem};
use serde::{Deserialize, Serialize};

use crate::error::MappingError;
use crate::transform::Transform;

/// One mapping row as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRuleConfig {
    /// Source-native field name (case-sensitive, as the reader emits it).
    pub source_field: String,
    /// Target field of the federated schema, e.g. `given_name`.
    pub canonical_field: String,
    /// Optional transform name; omitted or `"none"` selects the field default.
    #[serde(default)]
    pub transform: Option<String>,
    /// Rows where this rule yields no value (field absent, blank, or emptied
    /// by the transform) are rejected as malformed.
    #[serde(default)]
    pub required: bool,
}

impl MappingRuleConfig {
    pub fn new(
        source_field: impl Into<String>,
        canonical_field: impl Into<String>,
        transform: Option<&str>,
    ) -> Self {
        Self {
            source_field: source_field.into(),
            canonical_field: canonical_field.into(),
            transform: transform.map(str::to_string),
            required: false,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A validated mapping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    pub source_field: String,
    pub canonical_field: CanonicalField,
    pub transform: Transform,
    pub required: bool,
}

/// Validated rules for one source system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    source_system: SourceSystem,
    rules: Vec<MappingRule>,
}

impl MappingTable {
    /// Validates configuration rows into a table.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError`] for unknown transforms or fields, transforms that
    /// cannot populate their target, duplicate targets, empty source field names,
    /// or a table with no `patient_key` rule.
    pub fn new(
        source_system: SourceSystem,
        rows: &[MappingRuleConfig],
    ) -> Result<Self, MappingError> {
        let mut rules = Vec::with_capacity(rows.len());
        let mut targets = BTreeSet::new();

        for row in rows {
            let canonical_field: CanonicalField =
                row.canonical_field
                    .parse()
                    .map_err(|field| MappingError::UnknownCanonicalField {
                        source_system: source_system.clone(),
                        field,
                    })?;

            let source_field = row.source_field.trim();
            if source_field.is_empty() {
                return Err(MappingError::EmptySourceField {
                    source_system: source_system.clone(),
                    field: canonical_field,
                });
            }

            let transform = Transform::parse_optional(row.transform.as_deref())
                .map_err(|transform| MappingError::UnknownTransform {
                    source_system: source_system.clone(),
                    source_field: source_field.to_string(),
                    transform,
                })?
                .unwrap_or_else(|| Transform::default_for(canonical_field));

            if !transform.fits(canonical_field) {
                return Err(MappingError::IncompatibleTransform {
                    source_system: source_system.clone(),
                    field: canonical_field,
                    transform: transform.name(),
                });
            }

            if !targets.insert(canonical_field) {
                return Err(MappingError::DuplicateTarget {
                    source_system: source_system.clone(),
                    field: canonical_field,
                });
            }

            rules.push(MappingRule {
                source_field: source_field.to_string(),
                canonical_field,
                transform,
                required: row.required,
            });
        }

        if !targets.contains(&CanonicalField::PatientKey) {
            return Err(MappingError::MissingPatientKeyRule { source_system });
        }

        Ok(Self {
            source_system,
            rules,
        })
    }

    pub fn source_system(&self) -> &SourceSystem {
        &self.source_system
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn rule_for(&self, field: CanonicalField) -> Option<&MappingRule> {
        self.rules.iter().find(|rule| rule.canonical_field == field)
    }

    /// Canonical fields no rule populates.
    pub fn unmapped_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| self.rule_for(*field).is_none())
            .collect()
    }
}
