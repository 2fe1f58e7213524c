//! `[linkage]` configuration and its validation into a [`LinkageEngine`].
//!
//! The raw types mirror the TOML layout; [`LinkageConfig::build`] checks every
//! value and produces the engine, so a bad section fails before any record is read.

use std::collections::{BTreeMap, BTreeSet};

use mpi_model::CanonicalField;
use serde::{Deserialize, Serialize};

use crate::blocking::{BlockingKey, BlockingStrategy, PairScope};
use crate::classify::{ClassificationPolicy, DEFAULT_WEIGHT};
use crate::compare::{Comparator, ComparatorKind, DEFAULT_NUMERIC_OFFSET, DEFAULT_STRING_THRESHOLD};
use crate::engine::LinkageEngine;
use crate::error::LinkageConfigError;
use crate::field::CompareField;

pub const DEFAULT_MATCH_THRESHOLD: f64 = 5.0;
pub const DEFAULT_POSSIBLE_THRESHOLD: f64 = 4.0;
pub const DEFAULT_MIN_AGREEMENTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkageConfig {
    pub blocking: BlockingConfig,
    pub pair_scope: PairScope,
    pub policy: PolicyConfig,
    pub comparators: Vec<ComparatorConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case", deny_unknown_fields)]
pub enum BlockingConfig {
    Full,
    Keys { keys: Vec<BlockingKeyConfig> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockingKeyConfig {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum PolicyConfig {
    Weighted {
        #[serde(default = "default_match_threshold")]
        match_threshold: f64,
        #[serde(default = "default_possible_threshold")]
        possible_threshold: f64,
    },
    AgreementCount {
        #[serde(default = "default_min_agreements")]
        min_agreements: usize,
    },
}

fn default_match_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_possible_threshold() -> f64 {
    DEFAULT_POSSIBLE_THRESHOLD
}

fn default_min_agreements() -> usize {
    DEFAULT_MIN_AGREEMENTS
}

/// One `[[linkage.comparators]]` row.
///
/// `field` compares the same attribute on both records; `left`/`right`
/// override it per side. `label` defaults to the field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparatorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl ComparatorConfig {
    pub fn new(field: &str, kind: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

impl Default for LinkageConfig {
    /// Block on sex; compare national id, full name, age and phone with
    /// weights 2.0 / 1.5 / 1.0 / 1.0; match at 5.0, possible duplicate at 4.0.
    fn default() -> Self {
        Self {
            blocking: BlockingConfig::Keys {
                keys: vec![BlockingKeyConfig {
                    field: CanonicalField::Sex.as_str().to_string(),
                    prefix: None,
                }],
            },
            pair_scope: PairScope::All,
            policy: PolicyConfig::default(),
            comparators: vec![
                ComparatorConfig::new("national_id", "exact").weight(2.0),
                ComparatorConfig::new("full_name", "string").weight(1.5),
                ComparatorConfig::new("age", "numeric").weight(1.0),
                ComparatorConfig::new("phone", "exact").weight(1.0),
            ],
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::Weighted {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            possible_threshold: DEFAULT_POSSIBLE_THRESHOLD,
        }
    }
}

fn parse_field(name: &str) -> Result<CompareField, LinkageConfigError> {
    name.parse().map_err(|field| LinkageConfigError::UnknownField { field })
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl ComparatorConfig {
    fn build(&self, index: usize) -> Result<(Comparator, f64), LinkageConfigError> {
        let left_name = self.left.as_deref().or(self.field.as_deref());
        let right_name = self.right.as_deref().or(self.field.as_deref());
        let (Some(left_name), Some(right_name)) = (left_name, right_name) else {
            return Err(LinkageConfigError::MissingField { index });
        };
        let left = parse_field(left_name)?;
        let right = parse_field(right_name)?;
        let label = self
            .label
            .clone()
            .unwrap_or_else(|| left.as_str().to_string());

        let kind = match self.kind.trim().to_ascii_lowercase().as_str() {
            "exact" => ComparatorKind::Exact,
            "string" | "jaro_winkler" => {
                let threshold = self.threshold.unwrap_or(DEFAULT_STRING_THRESHOLD);
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(LinkageConfigError::ThresholdOutOfRange { label, threshold });
                }
                ComparatorKind::String { threshold }
            }
            "numeric" => {
                let offset = self.offset.unwrap_or(DEFAULT_NUMERIC_OFFSET);
                if !non_negative(offset) {
                    return Err(LinkageConfigError::NegativeOffset { label, offset });
                }
                ComparatorKind::Numeric { offset }
            }
            _ => {
                return Err(LinkageConfigError::UnknownComparatorKind {
                    label,
                    kind: self.kind.clone(),
                });
            }
        };

        let irrelevant = match kind {
            ComparatorKind::Exact if self.threshold.is_some() => Some("threshold"),
            ComparatorKind::Exact | ComparatorKind::String { .. } if self.offset.is_some() => {
                Some("offset")
            }
            ComparatorKind::Numeric { .. } if self.threshold.is_some() => Some("threshold"),
            _ => None,
        };
        if let Some(option) = irrelevant {
            return Err(LinkageConfigError::IrrelevantOption {
                label,
                option,
                kind: kind.name(),
            });
        }

        let weight = self.weight.unwrap_or(DEFAULT_WEIGHT);
        if !non_negative(weight) {
            return Err(LinkageConfigError::NegativeWeight { label, weight });
        }

        Ok((
            Comparator {
                label,
                left,
                right,
                kind,
            },
            weight,
        ))
    }
}

impl BlockingConfig {
    fn build(&self) -> Result<BlockingStrategy, LinkageConfigError> {
        match self {
            Self::Full => Ok(BlockingStrategy::Full),
            Self::Keys { keys } if keys.is_empty() => Err(LinkageConfigError::EmptyBlockingKeys),
            Self::Keys { keys } => keys
                .iter()
                .map(|key| {
                    if key.prefix == Some(0) {
                        return Err(LinkageConfigError::ZeroPrefix);
                    }
                    Ok(BlockingKey {
                        field: parse_field(&key.field)?,
                        prefix: key.prefix,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(BlockingStrategy::Keys),
        }
    }
}

impl LinkageConfig {
    /// Validates the section and builds the engine.
    ///
    /// # Errors
    ///
    /// Returns the first [`LinkageConfigError`] found.
    pub fn build(&self) -> Result<LinkageEngine, LinkageConfigError> {
        if self.comparators.is_empty() {
            return Err(LinkageConfigError::NoComparators);
        }
        let mut labels = BTreeSet::new();
        let mut comparators = Vec::with_capacity(self.comparators.len());
        let mut weights = BTreeMap::new();
        for (index, config) in self.comparators.iter().enumerate() {
            let (comparator, weight) = config.build(index)?;
            if !labels.insert(comparator.label.clone()) {
                return Err(LinkageConfigError::DuplicateLabel(comparator.label));
            }
            weights.insert(comparator.label.clone(), weight);
            comparators.push(comparator);
        }

        let policy = match self.policy {
            PolicyConfig::Weighted {
                match_threshold,
                possible_threshold,
            } => {
                if !match_threshold.is_finite() || !possible_threshold.is_finite() {
                    return Err(LinkageConfigError::NonFiniteThreshold);
                }
                if possible_threshold > match_threshold {
                    return Err(LinkageConfigError::ThresholdsInverted {
                        possible: possible_threshold,
                        matched: match_threshold,
                    });
                }
                ClassificationPolicy::Weighted {
                    weights,
                    match_threshold,
                    possible_threshold,
                }
            }
            PolicyConfig::AgreementCount { min_agreements } => {
                if min_agreements == 0 {
                    return Err(LinkageConfigError::ZeroAgreements);
                }
                if min_agreements > comparators.len() {
                    return Err(LinkageConfigError::TooManyAgreements {
                        min: min_agreements,
                        available: comparators.len(),
                    });
                }
                ClassificationPolicy::AgreementCount { min_agreements }
            }
        };

        Ok(LinkageEngine::new(
            comparators,
            policy,
            self.blocking.build()?,
            self.pair_scope,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        let engine = LinkageConfig::default().build().expect("default config");
        assert_eq!(engine.comparators().len(), 4);
        assert_eq!(engine.comparators()[1].left, CompareField::FullName);
        assert_eq!(engine.policy().name(), "weighted");
        assert_eq!(
            engine.blocking(),
            &BlockingStrategy::Keys(vec![BlockingKey::new(CanonicalField::Sex)])
        );
    }

    #[test]
    fn parses_toml_section() {
        let config: LinkageConfig = toml::from_str(
            r#"
            pair_scope = "cross_source"

            [blocking]
            strategy = "keys"
            keys = [{ field = "national_id", prefix = 4 }]

            [policy]
            kind = "agreement_count"

            [[comparators]]
            label = "curp"
            field = "national_id"
            kind = "exact"

            [[comparators]]
            field = "full_name"
            kind = "string"
            threshold = 0.9

            [[comparators]]
            field = "age"
            kind = "numeric"
            offset = 2
            "#,
        )
        .expect("toml");
        assert_eq!(config.policy, PolicyConfig::AgreementCount { min_agreements: 3 });
        let engine = config.build().expect("valid");
        assert_eq!(engine.pair_scope(), PairScope::CrossSource);
        assert_eq!(engine.comparators()[0].label, "curp");
        assert_eq!(
            engine.comparators()[2].kind,
            ComparatorKind::Numeric { offset: 2.0 }
        );
    }

    #[test]
    fn rejects_invalid_sections() {
        let mut config = LinkageConfig::default();
        config.comparators[0].kind = "soundex".to_string();
        assert!(matches!(
            config.build(),
            Err(LinkageConfigError::UnknownComparatorKind { .. })
        ));

        let mut config = LinkageConfig::default();
        config.comparators[1] = ComparatorConfig::new("full_name", "string").threshold(1.5);
        assert!(matches!(
            config.build(),
            Err(LinkageConfigError::ThresholdOutOfRange { .. })
        ));

        let mut config = LinkageConfig::default();
        config.comparators.push(ComparatorConfig::new("phone", "string"));
        assert_eq!(
            config.build().unwrap_err(),
            LinkageConfigError::DuplicateLabel("phone".to_string())
        );

        let mut config = LinkageConfig::default();
        config.policy = PolicyConfig::Weighted {
            match_threshold: 3.0,
            possible_threshold: 4.0,
        };
        assert!(matches!(
            config.build(),
            Err(LinkageConfigError::ThresholdsInverted { .. })
        ));

        let mut config = LinkageConfig::default();
        config.policy = PolicyConfig::AgreementCount { min_agreements: 0 };
        assert_eq!(config.build().unwrap_err(), LinkageConfigError::ZeroAgreements);

        let mut config = LinkageConfig::default();
        config.blocking = BlockingConfig::Keys { keys: Vec::new() };
        assert_eq!(config.build().unwrap_err(), LinkageConfigError::EmptyBlockingKeys);

        let mut config = LinkageConfig::default();
        config.comparators[2].field = Some("edad".to_string());
        assert!(matches!(config.build(), Err(LinkageConfigError::UnknownField { .. })));

        let mut config = LinkageConfig::default();
        config.comparators[2].weight = Some(-1.0);
        assert!(matches!(config.build(), Err(LinkageConfigError::NegativeWeight { .. })));
    }
}
