// src/utils/uli.rs

use regex::Regex;
use std::sync::LazyLock;

/// TESDA-style Unique Learner Identifier: three uppercase letters followed by
/// year, province, serial and sequence groups, e.g. "ABC-24-001-03907-001".
static ULI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}-\d{2}-\d{3}-\d{5}-\d{3}$").unwrap());

pub fn is_valid_uli(uli: &str) -> bool {
    ULI_PATTERN.is_match(uli)
}

/// Validator hook for request DTOs carrying a ULI.
pub fn validate_uli(uli: &str) -> Result<(), validator::ValidationError> {
    if !is_valid_uli(uli) {
        return Err(validator::ValidationError::new("invalid_uli"));
    }
    Ok(())
}
