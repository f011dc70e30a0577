//! Field validation helpers for request bodies.
//!
//! Handlers accumulate failures into a [`ValidationError`] so a single 422
//! reports every offending field at once.

use std::sync::LazyLock;

use regex::Regex;

use afya_core::ValidationError;

/// Client-supplied session identifiers.
pub static SESSION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,50}$").expect("valid pattern"));

/// National patient identifiers.
pub static PATIENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid pattern"));

/// Provider registry identifiers.
pub static PROVIDER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{5,15}$").expect("valid pattern"));

/// ISO calendar dates (`YYYY-MM-DD`).
pub static SERVICE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid pattern"));

/// Require a character-count range.
pub fn check_len(errors: &mut ValidationError, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.push(field, format!("must be {min}-{max} characters"));
    }
}

/// Require a full-string regex match.
pub fn check_pattern(errors: &mut ValidationError, field: &str, value: &str, pattern: &Regex) {
    if !pattern.is_match(value) {
        errors.push(field, format!("must match {}", pattern.as_str()));
    }
}

/// Require membership in a fixed set.
pub fn check_one_of(errors: &mut ValidationError, field: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value) {
        errors.push(field, format!("must be one of: {}", allowed.join(", ")));
    }
}

/// Require an element count range.
pub fn check_count<T>(errors: &mut ValidationError, field: &str, items: &[T], min: usize, max: usize) {
    if items.len() < min || items.len() > max {
        errors.push(field, format!("must contain {min}-{max} entries"));
    }
}

/// Require an exclusive-min, inclusive-max numeric range.
pub fn check_amount(errors: &mut ValidationError, field: &str, value: f64, min_excl: f64, max_incl: f64) {
    if !(value > min_excl && value <= max_incl) {
        errors.push(
            field,
            format!("must be greater than {min_excl} and at most {max_incl}"),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_bounds_are_inclusive() {
        let mut errors = ValidationError::new();
        check_len(&mut errors, "message", "a", 1, 3);
        check_len(&mut errors, "message", "abc", 1, 3);
        assert!(errors.is_empty());
        check_len(&mut errors, "message", "", 1, 3);
        check_len(&mut errors, "message", "abcd", 1, 3);
        assert_eq!(errors.fields.len(), 2);
    }

    #[test]
    fn len_counts_characters_not_bytes() {
        let mut errors = ValidationError::new();
        // five Arabic characters, many more bytes
        check_len(&mut errors, "message", "مرحبا", 1, 5);
        assert!(errors.is_empty());
    }

    #[test]
    fn session_id_pattern() {
        assert!(SESSION_ID_RE.is_match("session_42-A"));
        assert!(!SESSION_ID_RE.is_match(""));
        assert!(!SESSION_ID_RE.is_match("has spaces"));
        assert!(!SESSION_ID_RE.is_match(&"x".repeat(51)));
    }

    #[test]
    fn patient_id_pattern() {
        assert!(PATIENT_ID_RE.is_match("1234567890"));
        assert!(!PATIENT_ID_RE.is_match("123456789"));
        assert!(!PATIENT_ID_RE.is_match("12345678901"));
        assert!(!PATIENT_ID_RE.is_match("12345abcde"));
    }

    #[test]
    fn provider_id_pattern() {
        assert!(PROVIDER_ID_RE.is_match("PRV01"));
        assert!(PROVIDER_ID_RE.is_match("A1B2C3D4E5F6G7H"));
        assert!(!PROVIDER_ID_RE.is_match("prv01"));
        assert!(!PROVIDER_ID_RE.is_match("PRV"));
    }

    #[test]
    fn service_date_pattern() {
        assert!(SERVICE_DATE_RE.is_match("2026-08-04"));
        assert!(!SERVICE_DATE_RE.is_match("04-08-2026"));
        assert!(!SERVICE_DATE_RE.is_match("2026/08/04"));
    }

    #[test]
    fn one_of_reports_allowed_values() {
        let mut errors = ValidationError::new();
        check_one_of(&mut errors, "language", "fr", &["en", "ar"]);
        assert_eq!(errors.fields[0].field, "language");
        assert!(errors.fields[0].message.contains("en, ar"));
    }

    #[test]
    fn count_bounds() {
        let mut errors = ValidationError::new();
        check_count(&mut errors, "codes", &["a"], 1, 3);
        assert!(errors.is_empty());
        check_count::<&str>(&mut errors, "codes", &[], 1, 3);
        check_count(&mut errors, "codes", &["a", "b", "c", "d"], 1, 3);
        assert_eq!(errors.fields.len(), 2);
    }

    #[test]
    fn amount_range_is_exclusive_min_inclusive_max() {
        let mut errors = ValidationError::new();
        check_amount(&mut errors, "amount", 100_000.0, 0.0, 100_000.0);
        assert!(errors.is_empty());
        check_amount(&mut errors, "amount", 0.0, 0.0, 100_000.0);
        check_amount(&mut errors, "amount", 100_000.5, 0.0, 100_000.0);
        assert_eq!(errors.fields.len(), 2);
    }
}
