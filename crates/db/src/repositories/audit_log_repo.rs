//! Repository for the `audit_log` table.

use barberlab_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::audit::{AuditLogEntry, NewAuditEntry};

const COLUMNS: &str = "id, entity_type, entity_id, action, changed_fields, actor_id, created_at";

pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Insert an entry. Takes a connection so mutations can emit their
    /// audit record inside the same transaction as the write itself.
    pub async fn insert(
        conn: &mut PgConnection,
        entry: &NewAuditEntry,
    ) -> Result<AuditLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_log (entity_type, entity_id, action, changed_fields, actor_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLogEntry>(&query)
            .bind(entry.entity_type)
            .bind(entry.entity_id)
            .bind(entry.action)
            .bind(&entry.changed_fields)
            .bind(entry.actor_id)
            .fetch_one(conn)
            .await
    }

    /// Entries for one entity, newest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_log
             WHERE entity_type = $1 AND entity_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, AuditLogEntry>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }

    /// Most recent entries across all entities.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_log ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, AuditLogEntry>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
