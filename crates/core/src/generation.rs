//! Generation status and style-source types.

use crate::types::DbId;

/// Lifecycle status of a generation record. A record is created
/// `Pending` and transitions exactly once to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Pending,
    Succeeded,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Succeeded => "succeeded",
            GenerationStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<GenerationStatus> {
        match value {
            "pending" => Some(GenerationStatus::Pending),
            "succeeded" => Some(GenerationStatus::Succeeded),
            "failed" => Some(GenerationStatus::Failed),
            _ => None,
        }
    }
}

/// What the visitor asked the provider to aim for: a curated catalog
/// style, or their own uploaded reference identified by content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSource {
    Curated(DbId),
    Custom { fingerprint: String },
}

impl StyleSource {
    /// Label used in the JSON payload's `source` field.
    pub fn label(&self) -> &'static str {
        match self {
            StyleSource::Curated(_) => "curated",
            StyleSource::Custom { .. } => "custom",
        }
    }
}

/// Rate-limit event kinds.
pub mod actions {
    pub const START: &str = "start";
    pub const GENERATE: &str = "generate";
}
