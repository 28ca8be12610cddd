//! Curated catalog rows: hairstyles, beard styles, color swatches.

use barberlab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `hair_styles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HairStyle {
    pub id: DbId,
    pub name: Option<String>,
    pub description: String,
    pub image_path: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a hairstyle (seeds and admin tooling).
#[derive(Debug, Clone)]
pub struct CreateHairStyle {
    pub name: Option<String>,
    pub description: String,
    pub image_path: String,
    pub is_active: bool,
    pub sort_order: i32,
}

/// A row from the `beard_styles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BeardStyle {
    pub id: DbId,
    pub name: Option<String>,
    pub image_path: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a beard style.
#[derive(Debug, Clone)]
pub struct CreateBeardStyle {
    pub name: Option<String>,
    pub image_path: String,
    pub is_active: bool,
    pub sort_order: i32,
}

/// A row from the `color_options` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ColorOption {
    pub id: DbId,
    pub name: String,
    pub hex_code: String,
    pub scope: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a color option.
#[derive(Debug, Clone)]
pub struct CreateColorOption {
    pub name: String,
    pub hex_code: String,
    pub scope: String,
    pub is_active: bool,
    pub sort_order: i32,
}
