//! Match classification of comparison vectors.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::compare::ComparisonVector;

/// Weight used for comparators without a configured weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Match,
    PossibleDuplicate,
    NonMatch,
}

impl MatchOutcome {
    /// Whether the outcome merges the pair's clusters.
    pub fn links(self) -> bool {
        !matches!(self, Self::NonMatch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::PossibleDuplicate => "possible_duplicate",
            Self::NonMatch => "non_match",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchDecision {
    pub outcome: MatchOutcome,
    /// Weighted sum, or the agreement count under the unweighted policy.
    pub score: f64,
}

/// Weighted scoring: `score = Σ weight(label) * agreement(label)`.
///
/// `score >= match_threshold` is a match, `possible_threshold <= score` a
/// possible duplicate, anything lower a non-match.
pub fn classify(
    vector: &ComparisonVector,
    weights: &BTreeMap<String, f64>,
    match_threshold: f64,
    possible_threshold: f64,
) -> MatchDecision {
    let score: f64 = vector
        .entries()
        .iter()
        .map(|entry| weights.get(&entry.label).copied().unwrap_or(DEFAULT_WEIGHT) * entry.agreement)
        .sum();
    let outcome = if score >= match_threshold {
        MatchOutcome::Match
    } else if score >= possible_threshold {
        MatchOutcome::PossibleDuplicate
    } else {
        MatchOutcome::NonMatch
    };
    MatchDecision { outcome, score }
}

/// Unweighted rule: at least `min_agreements` comparators agree.
pub fn classify_agreement(vector: &ComparisonVector, min_agreements: usize) -> MatchDecision {
    let count = vector.agreement_count();
    let outcome = if count >= min_agreements {
        MatchOutcome::Match
    } else {
        MatchOutcome::NonMatch
    };
    MatchDecision {
        outcome,
        score: count as f64,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationPolicy {
    Weighted {
        weights: BTreeMap<String, f64>,
        match_threshold: f64,
        possible_threshold: f64,
    },
    AgreementCount {
        min_agreements: usize,
    },
}

impl ClassificationPolicy {
    pub fn decide(&self, vector: &ComparisonVector) -> MatchDecision {
        match self {
            Self::Weighted {
                weights,
                match_threshold,
                possible_threshold,
            } => classify(vector, weights, *match_threshold, *possible_threshold),
            Self::AgreementCount { min_agreements } => classify_agreement(vector, *min_agreements),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Weighted { .. } => "weighted",
            Self::AgreementCount { .. } => "agreement_count",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparisonEntry;

    fn vector(agreements: &[(&str, bool)]) -> ComparisonVector {
        agreements
            .iter()
            .map(|&(label, agrees)| ComparisonEntry {
                label: label.to_string(),
                agreement: if agrees { 1.0 } else { 0.0 },
                similarity: None,
                difference: None,
            })
            .collect()
    }

    fn weights() -> BTreeMap<String, f64> {
        [("curp", 2.0), ("nombre", 1.5), ("edad", 1.0), ("telefono", 1.0)]
            .into_iter()
            .map(|(label, weight)| (label.to_string(), weight))
            .collect()
    }

    #[test]
    fn weighted_thresholds() {
        let all = vector(&[("curp", true), ("nombre", true), ("edad", true), ("telefono", true)]);
        let decision = classify(&all, &weights(), 5.0, 4.0);
        assert_eq!(decision.outcome, MatchOutcome::Match);
        assert!((decision.score - 5.5).abs() < 1e-9);

        let no_phone = vector(&[("curp", true), ("nombre", true), ("edad", true), ("telefono", false)]);
        assert_eq!(
            classify(&no_phone, &weights(), 5.0, 4.0).outcome,
            MatchOutcome::PossibleDuplicate
        );

        let name_only = vector(&[("curp", false), ("nombre", true), ("edad", true), ("telefono", false)]);
        assert_eq!(classify(&name_only, &weights(), 5.0, 4.0).outcome, MatchOutcome::NonMatch);
    }

    #[test]
    fn unknown_labels_weigh_one() {
        let decision = classify(&vector(&[("other", true)]), &BTreeMap::new(), 1.0, 0.5);
        assert_eq!(decision.outcome, MatchOutcome::Match);
    }

    #[test]
    fn agreement_count_rule() {
        let three = vector(&[("a", true), ("b", true), ("c", true), ("d", false)]);
        let two = vector(&[("a", true), ("b", true), ("c", false), ("d", false)]);
        let policy = ClassificationPolicy::AgreementCount { min_agreements: 3 };
        assert_eq!(policy.decide(&three).outcome, MatchOutcome::Match);
        assert_eq!(policy.decide(&two).outcome, MatchOutcome::NonMatch);
        assert!((policy.decide(&two).score - 2.0).abs() < 1e-9);
    }
}
