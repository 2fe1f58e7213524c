//! Field comparators and the per-pair comparison vector.

use mpi_model::CanonicalPatientRecord;
use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use crate::field::CompareField;

pub const DEFAULT_STRING_THRESHOLD: f64 = 0.85;
pub const DEFAULT_NUMERIC_OFFSET: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComparatorKind {
    /// Agreement when the normalized values are identical.
    Exact,
    /// Jaro-Winkler similarity at or above `threshold`.
    String { threshold: f64 },
    /// Absolute difference at most `offset`.
    Numeric { offset: f64 },
}

impl ComparatorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::String { .. } => "string",
            Self::Numeric { .. } => "numeric",
        }
    }
}

/// Compares one attribute of the left record with one of the right record.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    pub label: String,
    pub left: CompareField,
    pub right: CompareField,
    pub kind: ComparatorKind,
}

impl Comparator {
    /// Comparator over the same field on both sides, labelled after the field.
    pub fn on(field: impl Into<CompareField>, kind: ComparatorKind) -> Self {
        let field = field.into();
        Self {
            label: field.as_str().to_string(),
            left: field,
            right: field,
            kind,
        }
    }

    #[must_use]
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Never fails: a missing or malformed value on either side disagrees.
    pub fn evaluate(&self, a: &CanonicalPatientRecord, b: &CanonicalPatientRecord) -> ComparisonEntry {
        let mut entry = ComparisonEntry {
            label: self.label.clone(),
            agreement: 0.0,
            similarity: None,
            difference: None,
        };
        match self.kind {
            ComparatorKind::Exact => {
                if let (Some(x), Some(y)) = (self.left.text(a), self.right.text(b)) {
                    entry.agreement = agreement(x == y);
                }
            }
            ComparatorKind::String { threshold } => {
                if let (Some(x), Some(y)) = (self.left.text(a), self.right.text(b)) {
                    let score = jaro_winkler::similarity(x.chars(), y.chars());
                    entry.similarity = Some(score);
                    entry.agreement = agreement(score >= threshold);
                }
            }
            ComparatorKind::Numeric { offset } => {
                if let (Some(x), Some(y)) = (self.left.number(a), self.right.number(b)) {
                    let difference = (x - y).abs();
                    entry.difference = Some(difference);
                    entry.agreement = agreement(difference <= offset);
                }
            }
        }
        entry
    }
}

fn agreement(agrees: bool) -> f64 {
    if agrees { 1.0 } else { 0.0 }
}

/// Result of one comparator on one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEntry {
    pub label: String,
    /// `1.0` on agreement, otherwise `0.0`.
    pub agreement: f64,
    /// Raw Jaro-Winkler score for string comparators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    /// Absolute difference for numeric comparators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
}

impl ComparisonEntry {
    pub fn agrees(&self) -> bool {
        self.agreement > 0.0
    }
}

/// Comparator results for one candidate pair, in comparator order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComparisonVector {
    entries: Vec<ComparisonEntry>,
}

impl ComparisonVector {
    pub fn entries(&self) -> &[ComparisonEntry] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<&ComparisonEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    /// Agreement value for `label`; unknown labels read as `0.0`.
    pub fn agreement(&self, label: &str) -> f64 {
        self.get(label).map_or(0.0, |entry| entry.agreement)
    }

    pub fn agreement_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.agrees()).count()
    }
}

impl FromIterator<ComparisonEntry> for ComparisonVector {
    fn from_iter<I: IntoIterator<Item = ComparisonEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Runs every comparator on the pair `(a, b)`.
pub fn compare(
    a: &CanonicalPatientRecord,
    b: &CanonicalPatientRecord,
    comparators: &[Comparator],
) -> ComparisonVector {
    comparators
        .iter()
        .map(|comparator| comparator.evaluate(a, b))
        .collect()
}
