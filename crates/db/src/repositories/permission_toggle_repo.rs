//! Repository for the `permission_toggles` table.
//!
//! Every mutation takes an explicit `performed_by` actor and emits a
//! snapshot-diff audit entry in the same transaction as the write, so
//! the audit trail can never drift from the data.

use barberlab_core::audit::{create_changes, delete_changes, diff_states, AuditAction};
use barberlab_core::permissions::{resolve_toggle, ToggleTarget};
use barberlab_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::audit::NewAuditEntry;
use crate::models::permission::PermissionToggle;
use crate::repositories::AuditLogRepo;

const COLUMNS: &str = "id, key, role, user_id, is_allowed, updated_by, updated_at";

const ENTITY_TYPE: &str = "permission_toggle";

pub struct PermissionToggleRepo;

impl PermissionToggleRepo {
    async fn find_in_tx(
        conn: &mut PgConnection,
        key: &str,
        target: &ToggleTarget,
    ) -> Result<Option<PermissionToggle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM permission_toggles
             WHERE key = $1 AND role IS NOT DISTINCT FROM $2 AND user_id IS NOT DISTINCT FROM $3"
        );
        sqlx::query_as::<_, PermissionToggle>(&query)
            .bind(key)
            .bind(target.role())
            .bind(target.user_id())
            .fetch_optional(conn)
            .await
    }

    /// Create or update the toggle for (key, target), recording who did
    /// it and what changed.
    pub async fn set(
        pool: &PgPool,
        key: &str,
        target: &ToggleTarget,
        is_allowed: bool,
        performed_by: Option<DbId>,
    ) -> Result<PermissionToggle, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing = Self::find_in_tx(&mut tx, key, target).await?;
        let (toggle, action, changes) = match existing {
            Some(before) => {
                let query = format!(
                    "UPDATE permission_toggles
                     SET is_allowed = $2, updated_by = $3, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {COLUMNS}"
                );
                let after = sqlx::query_as::<_, PermissionToggle>(&query)
                    .bind(before.id)
                    .bind(is_allowed)
                    .bind(performed_by)
                    .fetch_one(&mut *tx)
                    .await?;
                let changes = diff_states(
                    &serde_json::to_value(&before).unwrap_or_default(),
                    &serde_json::to_value(&after).unwrap_or_default(),
                );
                (after, AuditAction::Update, changes)
            }
            None => {
                let query = format!(
                    "INSERT INTO permission_toggles (key, role, user_id, is_allowed, updated_by)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING {COLUMNS}"
                );
                let created = sqlx::query_as::<_, PermissionToggle>(&query)
                    .bind(key)
                    .bind(target.role())
                    .bind(target.user_id())
                    .bind(is_allowed)
                    .bind(performed_by)
                    .fetch_one(&mut *tx)
                    .await?;
                let changes =
                    create_changes(&serde_json::to_value(&created).unwrap_or_default());
                (created, AuditAction::Create, changes)
            }
        };

        if !changes.is_empty() {
            AuditLogRepo::insert(
                &mut tx,
                &NewAuditEntry {
                    entity_type: ENTITY_TYPE,
                    entity_id: toggle.id,
                    action: action.as_str(),
                    changed_fields: serde_json::Value::Object(changes),
                    actor_id: performed_by,
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(toggle)
    }

    /// Remove the toggle for (key, target). Returns `true` when a row
    /// was deleted; the deletion is audited with the full prior state.
    pub async fn clear(
        pool: &PgPool,
        key: &str,
        target: &ToggleTarget,
        performed_by: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(before) = Self::find_in_tx(&mut tx, key, target).await? else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM permission_toggles WHERE id = $1")
            .bind(before.id)
            .execute(&mut *tx)
            .await?;

        let changes = delete_changes(&serde_json::to_value(&before).unwrap_or_default());
        AuditLogRepo::insert(
            &mut tx,
            &NewAuditEntry {
                entity_type: ENTITY_TYPE,
                entity_id: before.id,
                action: AuditAction::Delete.as_str(),
                changed_fields: serde_json::Value::Object(changes),
                actor_id: performed_by,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Resolve a permission for a user: user toggle beats role toggle
    /// beats the caller's default.
    pub async fn resolve(
        pool: &PgPool,
        key: &str,
        user_id: DbId,
        role: &str,
        default: bool,
    ) -> Result<bool, sqlx::Error> {
        let user_toggle: Option<(bool,)> = sqlx::query_as(
            "SELECT is_allowed FROM permission_toggles WHERE key = $1 AND user_id = $2",
        )
        .bind(key)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let role_toggle: Option<(bool,)> = sqlx::query_as(
            "SELECT is_allowed FROM permission_toggles
             WHERE key = $1 AND role = $2 AND user_id IS NULL",
        )
        .bind(key)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(resolve_toggle(
            user_toggle.map(|(v,)| v),
            role_toggle.map(|(v,)| v),
            default,
        ))
    }

    /// All toggles, stable order for admin display.
    pub async fn list(pool: &PgPool) -> Result<Vec<PermissionToggle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permission_toggles ORDER BY key, role, user_id");
        sqlx::query_as::<_, PermissionToggle>(&query)
            .fetch_all(pool)
            .await
    }
}
