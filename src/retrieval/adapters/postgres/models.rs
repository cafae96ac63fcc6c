//! Diesel row models for stored objects.

use super::schema::qc_objects;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for stored object versions.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = qc_objects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoredObjectRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Namespace (agent).
    pub agent: String,
    /// Object name.
    pub object_name: String,
    /// JSON payload.
    pub payload: Value,
    /// Version timestamp.
    pub created_at: DateTime<Utc>,
}
