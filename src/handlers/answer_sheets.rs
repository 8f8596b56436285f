// src/handlers/answer_sheets.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    models::answer_sheet::{AnswerSheet, SheetListParams, SubmitAnswerSheetRequest},
};

/// Records one answer sheet for a learner's test attempt.
///
/// The referenced test must exist at submission time; the sheet itself is
/// immutable afterwards. Sheets can still dangle later if the test is
/// deleted, the batch aggregator skips those.
pub async fn submit_sheet(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SubmitAnswerSheetRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let test_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM tests WHERE id = ?")
        .bind(payload.test_id)
        .fetch_optional(&pool)
        .await?;

    if test_exists.is_none() {
        return Err(AppError::NotFound("Test not found".to_string()));
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO answer_sheets (uli, test_id, answers)
         VALUES (?, ?, ?)
         RETURNING id",
    )
    .bind(&payload.uli)
    .bind(payload.test_id)
    .bind(SqlJson(&payload.answers))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store answer sheet: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let sheet = sqlx::query_as::<_, AnswerSheet>(
        "SELECT id, uli, test_id, answers, submitted_at
         FROM answer_sheets
         WHERE id = ?",
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(sheet)))
}

/// Lists answer sheets, optionally filtered by learner ULI.
pub async fn list_sheets(
    State(pool): State<SqlitePool>,
    Query(params): Query<SheetListParams>,
) -> Result<impl IntoResponse, AppError> {
    let sheets = sqlx::query_as::<_, AnswerSheet>(
        "SELECT id, uli, test_id, answers, submitted_at
         FROM answer_sheets
         WHERE (? IS NULL OR uli = ?)
         ORDER BY id DESC",
    )
    .bind(&params.uli)
    .bind(&params.uli)
    .fetch_all(&pool)
    .await?;

    Ok(Json(sheets))
}
