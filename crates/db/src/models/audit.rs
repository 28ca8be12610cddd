//! Audit log entry model.

use barberlab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `audit_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLogEntry {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub action: String,
    pub changed_fields: serde_json::Value,
    pub actor_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for inserting an audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub entity_type: &'static str,
    pub entity_id: DbId,
    pub action: &'static str,
    pub changed_fields: serde_json::Value,
    pub actor_id: Option<DbId>,
}
