//! Shared input validation helpers.
//!
//! Range and identifier checks used by several use cases. Every failure is a
//! [`CoreError::Validation`] naming the offending field.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::DbId;

/// Chapter keys are short slugs such as `"1"`, `"4"` or `"unit-3b"`.
const CHAPTER_KEY_PATTERN: &str = r"^[A-Za-z0-9_-]{1,64}$";

static CHAPTER_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CHAPTER_KEY_PATTERN).expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Validate that a value falls within `[0, 100]`.
pub fn validate_percentage(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate a chapter key (non-empty slug).
pub fn validate_chapter_key(chapter_id: &str) -> Result<(), CoreError> {
    if chapter_id.trim().is_empty() {
        return Err(CoreError::Validation("chapter_id is required".to_string()));
    }
    if !CHAPTER_KEY_RE.is_match(chapter_id) {
        return Err(CoreError::Validation(format!(
            "chapter_id '{chapter_id}' is malformed"
        )));
    }
    Ok(())
}

/// Validate a database id supplied by a caller.
pub fn validate_id(id: DbId, name: &str) -> Result<(), CoreError> {
    if id <= 0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a positive id, got {id}"
        )));
    }
    Ok(())
}

/// Validate the shape of an email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !EMAIL_RE.is_match(email) {
        return Err(CoreError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}
