// src/models/archive.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'archived_records' table.
///
/// A single generic envelope replaces per-entity "deleted" copies: the full
/// row of a deleted entity is stored as JSON next to its type tag, so any
/// entity can be archived without a bespoke schema.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ArchivedRecord {
    pub id: i64,

    /// 'test' or 'result'.
    pub entity_type: String,

    /// The deleted row, serialized in full.
    pub payload: Json<serde_json::Value>,

    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}
