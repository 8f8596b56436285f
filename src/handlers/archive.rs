// src/handlers/archive.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{error::AppError, models::archive::ArchivedRecord};

/// Lists archived (deleted) entities, newest first.
pub async fn list_archived(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let records = sqlx::query_as::<_, ArchivedRecord>(
        "SELECT id, entity_type, payload, deleted_at
         FROM archived_records
         ORDER BY id DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(records))
}
