//! Value normalization for federated patient records.
//!
//! Every function here is total: `None` in, `None` out, and malformed input
//! degrades to `None` instead of an error.
//!
//! # Text rules
//!
//! - Surrounding whitespace is trimmed and internal runs collapse to one space
//! - Accented Latin letters are transliterated to unaccented ASCII (`José` -> `JOSE`)
//! - The result is upper-cased
//! - Blank results are treated as missing

#![deny(unsafe_code)]

use mpi_model::Sex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Largest digit count that always fits in a `u64`.
const MAX_PARSED_DIGITS: usize = 19;

/// Normalizes an optional text value.
///
/// Returns `None` for missing input and for input that is blank once trimmed.
pub fn normalize(value: Option<&str>) -> Option<String> {
    let normalized = normalize_text(value?);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Normalizes text without the missing-value wrapper.
pub fn normalize_text(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let stripped: String = upper.nfd().filter(|ch| !is_combining_mark(*ch)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes accents without changing case or spacing.
pub fn strip_accents(raw: &str) -> String {
    raw.nfd().filter(|ch| !is_combining_mark(*ch)).collect()
}

/// Strips every non-digit character and parses the leading `max_len` digits.
///
/// `"NSS-0012 3456 789"` with `max_len = 8` keeps `00123456` and yields `123456`.
/// Returns `None` when no digits remain.
pub fn extract_digits(value: Option<&str>, max_len: usize) -> Option<u64> {
    let take = max_len.min(MAX_PARSED_DIGITS);
    if take == 0 {
        return None;
    }
    let digits: String = value?
        .chars()
        .filter(char::is_ascii_digit)
        .take(take)
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Keeps only ASCII digits, preserving leading zeros (phone numbers).
pub fn digits_only(value: Option<&str>) -> Option<String> {
    let digits: String = value?.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() { None } else { Some(digits) }
}

/// Maps the sex/gender codes used by the source hospitals onto [`Sex`].
pub fn normalize_sex(value: Option<&str>) -> Option<Sex> {
    let normalized = normalize(value)?;
    match normalized.as_str() {
        "M" | "H" | "1" | "MASCULINO" | "HOMBRE" | "MALE" | "MAN" => Some(Sex::Male),
        "F" | "2" | "FEMENINO" | "MUJER" | "FEMALE" | "WOMAN" => Some(Sex::Female),
        _ => None,
    }
}

/// Returns the `index`-th whitespace token of the normalized value.
pub fn token(value: Option<&str>, index: usize) -> Option<String> {
    let normalized = normalize(value)?;
    normalized.split(' ').nth(index).map(str::to_string)
}

/// Returns every normalized token after the first one, joined by spaces.
pub fn tokens_after_first(value: Option<&str>) -> Option<String> {
    let normalized = normalize(value)?;
    let (_, rest) = normalized.split_once(' ')?;
    Some(rest.to_string())
}
