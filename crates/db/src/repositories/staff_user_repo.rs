//! Repository for the `staff_users` table.

use barberlab_core::types::DbId;
use sqlx::PgPool;

use crate::models::staff::{CreateStaffUser, StaffUser};

const COLUMNS: &str = "id, username, display_name, role, is_active, created_at, updated_at";

pub struct StaffUserRepo;

impl StaffUserRepo {
    pub async fn create(pool: &PgPool, input: &CreateStaffUser) -> Result<StaffUser, sqlx::Error> {
        let query = format!(
            "INSERT INTO staff_users (username, display_name, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StaffUser>(&query)
            .bind(&input.username)
            .bind(&input.display_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StaffUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff_users WHERE id = $1");
        sqlx::query_as::<_, StaffUser>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<StaffUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff_users WHERE username = $1");
        sqlx::query_as::<_, StaffUser>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }
}
