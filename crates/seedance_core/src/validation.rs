//! Collected validation results.
//!
//! Validation never stops at the first failure: every rule is evaluated and
//! each violation is recorded, so callers see the whole list at once.

use regex::Regex;
use seedance_error::{SeedanceError, SeedanceResult, ValidationViolation, ViolationKind};
use std::sync::LazyLock;

/// Identifiers: word characters, hyphens and dots.
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-.]+$").expect("identifier pattern is valid"));

/// Returns true if `value` is a non-empty identifier of word/hyphen/dot characters.
pub fn is_identifier(value: &str) -> bool {
    IDENTIFIER.is_match(value)
}

/// Ordered list of violations found while validating one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<ValidationViolation>,
}

impl ValidationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no violation was recorded.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Recorded violations, in the order the rules ran.
    pub fn violations(&self) -> &[ValidationViolation] {
        &self.violations
    }

    /// Records a violation.
    pub fn add(&mut self, kind: ViolationKind, field: impl Into<String>, message: impl Into<String>) {
        self.violations
            .push(ValidationViolation::new(kind, field, message));
    }

    /// Records an out-of-range violation unless `min <= value <= max`.
    ///
    /// NaN is always out of range.
    pub fn check_range<T>(&mut self, field: &str, value: T, min: T, max: T)
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if !(value >= min && value <= max) {
            self.add(
                ViolationKind::OutOfRange,
                field,
                format!("{} must be between {} and {}, got {}", field, min, max, value),
            );
        }
    }

    /// Records a length violation unless the char count is within `[min, max]`.
    pub fn check_chars(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            self.add(
                ViolationKind::Length,
                field,
                format!(
                    "{} must be between {} and {} characters, got {}",
                    field, min, max, len
                ),
            );
        }
    }

    /// Records a length violation unless the list has between `min` and `max` items.
    pub fn check_items(&mut self, field: &str, len: usize, min: usize, max: usize) {
        if len < min || len > max {
            self.add(
                ViolationKind::Length,
                field,
                format!("{} must contain between {} and {} items, got {}", field, min, max, len),
            );
        }
    }

    /// Formats violations as a human-readable numbered list.
    pub fn format_errors(&self) -> String {
        let mut output = String::new();

        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(&format!("Error {}: {}", i + 1, violation));
        }

        output
    }

    /// Returns `value` if the report is clean, otherwise a validation error
    /// carrying every violation.
    #[track_caller]
    pub fn into_result<T>(self, value: T) -> SeedanceResult<T> {
        if self.is_valid() {
            Ok(value)
        } else {
            Err(SeedanceError::validation(self.violations))
        }
    }
}
