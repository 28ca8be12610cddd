//! Repository for the curated style/color catalog.
//!
//! The playground only ever reads active rows, ordered by
//! (sort_order, id). Color lookups are scoped: a hair slot accepts
//! colors scoped 'hair' or 'both', a beard slot 'beard' or 'both'.

use barberlab_core::selection::ColorScope;
use barberlab_core::types::DbId;
use sqlx::PgPool;

use crate::models::catalog::{
    BeardStyle, ColorOption, CreateBeardStyle, CreateColorOption, CreateHairStyle, HairStyle,
};

const STYLE_COLUMNS: &str =
    "id, name, description, image_path, is_active, sort_order, created_at, updated_at";
const BEARD_COLUMNS: &str = "id, name, image_path, is_active, sort_order, created_at, updated_at";
const COLOR_COLUMNS: &str =
    "id, name, hex_code, scope, is_active, sort_order, created_at, updated_at";

pub struct CatalogRepo;

impl CatalogRepo {
    pub async fn list_active_styles(pool: &PgPool) -> Result<Vec<HairStyle>, sqlx::Error> {
        let query = format!(
            "SELECT {STYLE_COLUMNS} FROM hair_styles
             WHERE is_active = TRUE
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, HairStyle>(&query).fetch_all(pool).await
    }

    pub async fn list_active_beard_styles(pool: &PgPool) -> Result<Vec<BeardStyle>, sqlx::Error> {
        let query = format!(
            "SELECT {BEARD_COLUMNS} FROM beard_styles
             WHERE is_active = TRUE
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, BeardStyle>(&query).fetch_all(pool).await
    }

    /// Active colors applicable to the given slot.
    pub async fn list_active_colors(
        pool: &PgPool,
        scope: ColorScope,
    ) -> Result<Vec<ColorOption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLOR_COLUMNS} FROM color_options
             WHERE is_active = TRUE AND (scope = $1 OR scope = 'both')
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, ColorOption>(&query)
            .bind(scope.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn find_active_style(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<HairStyle>, sqlx::Error> {
        let query =
            format!("SELECT {STYLE_COLUMNS} FROM hair_styles WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, HairStyle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_active_beard_style(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BeardStyle>, sqlx::Error> {
        let query =
            format!("SELECT {BEARD_COLUMNS} FROM beard_styles WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, BeardStyle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Scoped color lookup: only returns the row if it is active and
    /// applicable to the requested slot.
    pub async fn find_active_color(
        pool: &PgPool,
        id: DbId,
        scope: ColorScope,
    ) -> Result<Option<ColorOption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLOR_COLUMNS} FROM color_options
             WHERE id = $1 AND is_active = TRUE AND (scope = $2 OR scope = 'both')"
        );
        sqlx::query_as::<_, ColorOption>(&query)
            .bind(id)
            .bind(scope.as_str())
            .fetch_optional(pool)
            .await
    }

    // ---- inserts (seed tooling and tests) ----

    pub async fn create_style(
        pool: &PgPool,
        input: &CreateHairStyle,
    ) -> Result<HairStyle, sqlx::Error> {
        let query = format!(
            "INSERT INTO hair_styles (name, description, image_path, is_active, sort_order)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {STYLE_COLUMNS}"
        );
        sqlx::query_as::<_, HairStyle>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_path)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn create_beard_style(
        pool: &PgPool,
        input: &CreateBeardStyle,
    ) -> Result<BeardStyle, sqlx::Error> {
        let query = format!(
            "INSERT INTO beard_styles (name, image_path, is_active, sort_order)
             VALUES ($1, $2, $3, $4)
             RETURNING {BEARD_COLUMNS}"
        );
        sqlx::query_as::<_, BeardStyle>(&query)
            .bind(&input.name)
            .bind(&input.image_path)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn create_color(
        pool: &PgPool,
        input: &CreateColorOption,
    ) -> Result<ColorOption, sqlx::Error> {
        let query = format!(
            "INSERT INTO color_options (name, hex_code, scope, is_active, sort_order)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLOR_COLUMNS}"
        );
        sqlx::query_as::<_, ColorOption>(&query)
            .bind(&input.name)
            .bind(&input.hex_code)
            .bind(&input.scope)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }
}
