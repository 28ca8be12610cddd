//! Permission toggle model.

use barberlab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `permission_toggles` table. Exactly one of
/// {`role`, `user_id`} is set (database CHECK constraint).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PermissionToggle {
    pub id: DbId,
    pub key: String,
    pub role: Option<String>,
    pub user_id: Option<DbId>,
    pub is_allowed: bool,
    pub updated_by: Option<DbId>,
    pub updated_at: Timestamp,
}
