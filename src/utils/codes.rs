// src/utils/codes.rs

use uuid::Uuid;

use crate::config::TEST_CODE_LENGTH;

/// Generates a test code: 8 uppercase hex characters, e.g. "3FA9C1D2".
///
/// No collision retry: a duplicate fails the unique index on insert and
/// surfaces as a conflict to the caller.
pub fn generate_test_code() -> String {
    Uuid::new_v4().simple().to_string()[..TEST_CODE_LENGTH].to_uppercase()
}

/// Generates an identifier for a question or option embedded in a test
/// document (12 lowercase hex characters).
pub fn generate_embedded_id() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}
