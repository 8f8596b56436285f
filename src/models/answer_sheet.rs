// src/models/answer_sheet.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::utils::uli::validate_uli;

/// Represents the 'answer_sheets' table in the database.
/// One row per learner-per-test-attempt, immutable after creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnswerSheet {
    pub id: i64,

    /// Learner's Unique Learner Identifier (e.g. "ABC-24-001-03907-001").
    pub uli: String,

    /// References tests.id by convention; no relational constraint.
    pub test_id: i64,

    /// Selected option per question, embedded as a JSON array.
    pub answers: Json<Vec<Answer>>,

    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One selected option, referencing ids embedded in the test document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub selected_option: String,
}

/// DTO for submitting an answer sheet.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerSheetRequest {
    #[validate(custom(function = validate_uli))]
    pub uli: String,

    pub test_id: i64,

    #[validate(custom(function = validate_answers))]
    pub answers: Vec<Answer>,
}

/// Query parameters for listing answer sheets.
#[derive(Debug, Deserialize)]
pub struct SheetListParams {
    pub uli: Option<String>,
}

fn validate_answers(answers: &[Answer]) -> Result<(), validator::ValidationError> {
    if answers.is_empty() {
        return Err(validator::ValidationError::new("no_answers_submitted"));
    }
    for answer in answers {
        if answer.question_id.is_empty() || answer.selected_option.is_empty() {
            return Err(validator::ValidationError::new("invalid_answer_reference"));
        }
    }
    Ok(())
}
