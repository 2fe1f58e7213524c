use thiserror::Error;

/// Invalid `[linkage]` configuration, detected before any record is compared.
#[derive(Debug, Error, PartialEq)]
pub enum LinkageConfigError {
    #[error("unknown comparator kind '{kind}' for '{label}' (expected exact, string or numeric)")]
    UnknownComparatorKind { label: String, kind: String },

    #[error("unknown field '{field}' (expected a canonical field or full_name)")]
    UnknownField { field: String },

    #[error("comparator #{index} names no field (set `field`, or both `left` and `right`)")]
    MissingField { index: usize },

    #[error("comparator '{label}': threshold {threshold} is outside [0, 1]")]
    ThresholdOutOfRange { label: String, threshold: f64 },

    #[error("comparator '{label}': offset {offset} must be a non-negative number")]
    NegativeOffset { label: String, offset: f64 },

    #[error("comparator '{label}': weight {weight} must be a non-negative number")]
    NegativeWeight { label: String, weight: f64 },

    #[error("comparator '{label}': '{option}' does not apply to {kind} comparators")]
    IrrelevantOption {
        label: String,
        option: &'static str,
        kind: &'static str,
    },

    #[error("duplicate comparator label '{0}'")]
    DuplicateLabel(String),

    #[error("at least one comparator is required")]
    NoComparators,

    #[error("possible_threshold {possible} exceeds match_threshold {matched}")]
    ThresholdsInverted { possible: f64, matched: f64 },

    #[error("thresholds must be finite numbers")]
    NonFiniteThreshold,

    #[error("min_agreements must be at least 1")]
    ZeroAgreements,

    #[error("min_agreements {min} exceeds the {available} configured comparators")]
    TooManyAgreements { min: usize, available: usize },

    #[error("key blocking needs at least one key")]
    EmptyBlockingKeys,

    #[error("blocking prefix must be at least 1 character")]
    ZeroPrefix,
}
