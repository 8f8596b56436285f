// src/handlers/results.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        answer_sheet::{Answer, AnswerSheet},
        result::{TestResult, TestSummary, UpdateRemarksRequest},
        test::{Question, Test},
    },
    utils::{archive::archive_record, html::clean_html},
};

/// Counts correct selections by joining answers against the question set.
///
/// Matching is fail-open: an answer referencing an unknown question id, or a
/// question with no option flagged correct, is skipped rather than treated as
/// an error. A test edited after submission therefore under-counts instead of
/// failing the whole scoring run.
pub(crate) fn grade_answers(answers: &[Answer], questions: &[Question]) -> i64 {
    let mut score = 0;
    for answer in answers {
        let Some(question) = questions.iter().find(|q| q.id == answer.question_id) else {
            tracing::debug!("Answer references unknown question id {}", answer.question_id);
            continue;
        };
        let Some(correct) = question.options.iter().find(|o| o.is_correct) else {
            tracing::debug!("Question {} has no option flagged correct", question.id);
            continue;
        };
        if answer.selected_option == correct.id {
            score += 1;
        }
    }
    score
}

/// Computes and persists the result for one answer sheet.
///
/// With `force` the write is an upsert that overwrites score, total and the
/// denormalized test fields. Without it an existing result is left untouched
/// and `None` is returned. Remarks and created_at are never modified here.
async fn store_result(
    pool: &SqlitePool,
    sheet: &AnswerSheet,
    test: &Test,
    force: bool,
) -> Result<Option<TestResult>, AppError> {
    let score = grade_answers(&sheet.answers, &test.questions);
    let total_questions = test.questions.len() as i64;

    let sql = if force {
        "INSERT INTO results (uli, test_id, test_code, subject, score, total_questions)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(uli, test_id) DO UPDATE SET
             score = excluded.score,
             total_questions = excluded.total_questions,
             test_code = excluded.test_code,
             subject = excluded.subject"
    } else {
        "INSERT INTO results (uli, test_id, test_code, subject, score, total_questions)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(uli, test_id) DO NOTHING"
    };

    let outcome = sqlx::query(sql)
        .bind(&sheet.uli)
        .bind(sheet.test_id)
        .bind(&test.test_code)
        .bind(&test.subject)
        .bind(score)
        .bind(total_questions)
        .execute(pool)
        .await?;

    if outcome.rows_affected() == 0 {
        return Ok(None);
    }

    let stored = sqlx::query_as::<_, TestResult>(
        "SELECT id, uli, test_id, test_code, subject, score, total_questions, remarks, created_at
         FROM results
         WHERE uli = ? AND test_id = ?",
    )
    .bind(&sheet.uli)
    .bind(sheet.test_id)
    .fetch_one(pool)
    .await?;

    Ok(Some(stored))
}

/// Lists every scoring result, newest first.
pub async fn list_results(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, TestResult>(
        "SELECT id, uli, test_id, test_code, subject, score, total_questions, remarks, created_at
         FROM results
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(results))
}

/// Scores a learner's most recent answer sheet and upserts the result.
///
/// * Locates the latest sheet submitted under the ULI.
/// * Resolves the referenced test.
/// * Overwrites any previously stored result for the (uli, test) pair.
pub async fn calculate(
    State(pool): State<SqlitePool>,
    Path(uli): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sheet = sqlx::query_as::<_, AnswerSheet>(
        "SELECT id, uli, test_id, answers, submitted_at
         FROM answer_sheets
         WHERE uli = ?
         ORDER BY submitted_at DESC, id DESC
         LIMIT 1",
    )
    .bind(&uli)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(format!("No answer sheet found for {}", uli)))?;

    let test = sqlx::query_as::<_, Test>(
        "SELECT id, test_code, subject, instruction, questions, created_at
         FROM tests
         WHERE id = ?",
    )
    .bind(sheet.test_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Referenced test not found".to_string()))?;

    let result = match store_result(&pool, &sheet, &test, true).await? {
        Some(result) => result,
        None => {
            return Err(AppError::InternalServerError(
                "Result upsert affected no rows".to_string(),
            ));
        }
    };

    Ok(Json(result))
}

/// Scores every answer sheet that does not yet have a result.
///
/// Sheets are processed sequentially in insertion order. A sheet whose test
/// reference cannot be resolved is skipped with a warning, and sheets already
/// scored are left untouched. Only newly created results are reported.
pub async fn calculate_all(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let tests = sqlx::query_as::<_, Test>(
        "SELECT id, test_code, subject, instruction, questions, created_at FROM tests",
    )
    .fetch_all(&pool)
    .await?;

    let tests_by_id: HashMap<i64, Test> = tests.into_iter().map(|t| (t.id, t)).collect();

    let sheets = sqlx::query_as::<_, AnswerSheet>(
        "SELECT id, uli, test_id, answers, submitted_at FROM answer_sheets ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    let mut created = Vec::new();
    for sheet in &sheets {
        let Some(test) = tests_by_id.get(&sheet.test_id) else {
            tracing::warn!(
                "Skipping answer sheet {}: test {} does not exist",
                sheet.id,
                sheet.test_id
            );
            continue;
        };

        if let Some(result) = store_result(&pool, sheet, test, false).await? {
            created.push(result);
        }
    }

    Ok(Json(serde_json::json!({
        "message": format!("Scored {} answer sheet(s)", created.len()),
        "results": created,
    })))
}

/// Point lookup on the (uli, test_code) key.
pub async fn get_result(
    State(pool): State<SqlitePool>,
    Path((uli, test_code)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let test_code = test_code.to_uppercase();

    let result = sqlx::query_as::<_, TestResult>(
        "SELECT id, uli, test_id, test_code, subject, score, total_questions, remarks, created_at
         FROM results
         WHERE uli = ? AND test_code = ?",
    )
    .bind(&uli)
    .bind(&test_code)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Result not found".to_string()))?;

    Ok(Json(result))
}

/// Overwrites only the remarks of a result; the score is not recomputed.
/// Remarks cannot be attached before scoring.
pub async fn update_remarks(
    State(pool): State<SqlitePool>,
    Path((uli, test_code)): Path<(String, String)>,
    Json(payload): Json<UpdateRemarksRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let test_code = test_code.to_uppercase();
    let remarks = clean_html(&payload.remarks);

    let outcome = sqlx::query("UPDATE results SET remarks = ? WHERE uli = ? AND test_code = ?")
        .bind(&remarks)
        .bind(&uli)
        .bind(&test_code)
        .execute(&pool)
        .await?;

    if outcome.rows_affected() == 0 {
        return Err(AppError::NotFound("Result not found".to_string()));
    }

    let result = sqlx::query_as::<_, TestResult>(
        "SELECT id, uli, test_id, test_code, subject, score, total_questions, remarks, created_at
         FROM results
         WHERE uli = ? AND test_code = ?",
    )
    .bind(&uli)
    .bind(&test_code)
    .fetch_one(&pool)
    .await?;

    Ok(Json(result))
}

/// Deletes a result by key, archiving the row first.
pub async fn delete_result(
    State(pool): State<SqlitePool>,
    Path((uli, test_code)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let test_code = test_code.to_uppercase();

    let result = sqlx::query_as::<_, TestResult>(
        "SELECT id, uli, test_id, test_code, subject, score, total_questions, remarks, created_at
         FROM results
         WHERE uli = ? AND test_code = ?",
    )
    .bind(&uli)
    .bind(&test_code)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Result not found".to_string()))?;

    let payload = serde_json::to_value(&result)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    archive_record(&pool, "result", payload).await?;

    sqlx::query("DELETE FROM results WHERE id = ?")
        .bind(result.id)
        .execute(&pool)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Result deleted" })))
}

/// Returns all results for a learner, most recent first.
/// An empty set is reported as 404, not as an empty array.
pub async fn get_user_results(
    State(pool): State<SqlitePool>,
    Path(uli): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, TestResult>(
        "SELECT id, uli, test_id, test_code, subject, score, total_questions, remarks, created_at
         FROM results
         WHERE uli = ?
         ORDER BY created_at DESC, id DESC",
    )
    .bind(&uli)
    .fetch_all(&pool)
    .await?;

    if results.is_empty() {
        return Err(AppError::NotFound(format!("No results found for {}", uli)));
    }

    Ok(Json(results))
}

/// Aggregated per-test row for the feedback dashboard.
pub async fn test_summary(
    State(pool): State<SqlitePool>,
    Path(test_code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let test_code = test_code.to_uppercase();

    let summary = sqlx::query_as::<_, TestSummary>(
        "SELECT test_code, subject,
                COUNT(*) AS attempts,
                AVG(score) AS average_score,
                MAX(score) AS highest_score,
                MIN(score) AS lowest_score
         FROM results
         WHERE test_code = ?
         GROUP BY test_code, subject",
    )
    .bind(&test_code)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to aggregate results for {}: {:?}", test_code, e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::NotFound("No results recorded for this test".to_string()))?;

    Ok(Json(summary))
}
