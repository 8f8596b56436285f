// src/utils/archive.rs

use sqlx::{SqlitePool, types::Json};

use crate::error::AppError;

/// Archives a deleted entity into the generic 'archived_records' envelope.
///
/// `payload` is the full row being removed, serialized by the caller.
/// Callers must write the archive entry before issuing the delete.
pub async fn archive_record(
    pool: &SqlitePool,
    entity_type: &str,
    payload: serde_json::Value,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO archived_records (entity_type, payload) VALUES (?, ?)")
        .bind(entity_type)
        .bind(Json(payload))
        .execute(pool)
        .await?;

    Ok(())
}
