//! Generation record models.

use barberlab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `generations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Generation {
    pub id: DbId,
    pub session_id: DbId,
    pub style_id: Option<DbId>,
    pub beard_style_id: Option<DbId>,
    pub hair_color_id: Option<DbId>,
    pub beard_color_id: Option<DbId>,
    pub selfie_path: String,
    pub custom_style_path: Option<String>,
    pub custom_style_fingerprint: String,
    pub result_path: Option<String>,
    pub provider: String,
    pub status: String,
    pub processing_ms: Option<i32>,
    pub error_message: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a pending generation record.
#[derive(Debug, Clone)]
pub struct CreateGeneration {
    pub session_id: DbId,
    pub style_id: Option<DbId>,
    pub beard_style_id: Option<DbId>,
    pub hair_color_id: Option<DbId>,
    pub beard_color_id: Option<DbId>,
    pub selfie_path: String,
    pub custom_style_path: Option<String>,
    pub custom_style_fingerprint: String,
    pub provider: String,
}

/// A generation joined with the catalog names the JSON payload shows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationDetail {
    pub id: DbId,
    pub session_id: DbId,
    pub style_id: Option<DbId>,
    pub status: String,
    pub provider: String,
    pub created_at: Timestamp,
    pub processing_ms: Option<i32>,
    pub result_path: Option<String>,
    pub style_name: Option<String>,
    pub beard_style_name: Option<String>,
    pub hair_color_name: Option<String>,
    pub beard_color_name: Option<String>,
}

impl GenerationDetail {
    /// Payload label for where the style came from.
    pub fn source(&self) -> &'static str {
        if self.style_id.is_some() {
            "curated"
        } else {
            "custom"
        }
    }
}

/// File references of a stale generation, for the retention sweep.
#[derive(Debug, Clone, FromRow)]
pub struct StaleGeneration {
    pub id: DbId,
    pub selfie_path: String,
    pub custom_style_path: Option<String>,
    pub result_path: Option<String>,
}
