//! Input rules shared by every write path.

use std::collections::HashMap;

use crate::error::ApiError;

/// Value an un-edited form field arrives with; treated as "nothing entered".
pub const PLACEHOLDER: &str = "string";

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

pub const MAX_EMAIL_LEN: usize = 30;

/// True when a text field carries no usable value.
pub fn is_blank_or_placeholder(value: &str) -> bool {
    value.trim().is_empty() || value == PLACEHOLDER
}

/// Reject a required text field that is blank or still the placeholder.
pub fn require_text(label: &str, value: &str) -> Result<(), ApiError> {
    if is_blank_or_placeholder(value) {
        tracing::warn!("{} is required", label);
        return Err(ApiError::validation_error(format!("{} is required", label), None));
    }
    Ok(())
}

/// Keep an optional update value only when it is meaningful.
pub fn provided(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank_or_placeholder(v))
}

/// Scores outside the 1..=5 range are rejected before any storage access.
pub fn check_score(score: i32) -> Result<(), ApiError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Ok(());
    }

    let mut field_errors = HashMap::new();
    field_errors.insert(
        "rating".to_string(),
        format!("must be between {} and {}", MIN_SCORE, MAX_SCORE),
    );
    Err(ApiError::unprocessable_entity(
        format!("Rating must be between {} and {}", MIN_SCORE, MAX_SCORE),
        field_errors,
    ))
}
