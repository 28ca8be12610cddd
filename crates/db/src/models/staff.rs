//! Staff account model (permission-toggle targets, audit actors).

use barberlab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `staff_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StaffUser {
    pub id: DbId,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a staff user.
#[derive(Debug, Clone)]
pub struct CreateStaffUser {
    pub username: String,
    pub display_name: String,
    pub role: String,
}
