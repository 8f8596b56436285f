// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'results' table in the database.
///
/// A materialized scoring record, at most one per (uli, test) pair.
/// `test_code` and `subject` are denormalized at scoring time so the row
/// survives later mutation or deletion of the test.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i64,
    pub uli: String,
    pub test_id: i64,
    pub test_code: String,
    pub subject: String,

    /// Count of correctly answered questions.
    pub score: i64,

    /// Question count of the test at scoring time.
    pub total_questions: i64,

    /// Free-text remarks, mutable independently of the score.
    pub remarks: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for updating only the remarks of a result.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRemarksRequest {
    #[validate(length(min = 1, max = 2000))]
    pub remarks: String,
}

/// Aggregated per-test row backing the feedback dashboard.
#[derive(Debug, Serialize, FromRow)]
pub struct TestSummary {
    pub test_code: String,
    pub subject: String,
    pub attempts: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub lowest_score: i64,
}
