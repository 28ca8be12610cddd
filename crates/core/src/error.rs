use crate::types::DbId;

/// Domain error taxonomy shared across the workspace.
///
/// Each variant corresponds to one class of client-visible failure; the
/// api crate maps them onto HTTP statuses. Messages here are user-safe
/// and surfaced verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// IP rate limit, session quota, or cooldown violation.
    /// `retry_after_secs` becomes a `Retry-After` header when present.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a rate-limit error without a retry hint.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        CoreError::RateLimited {
            message: message.into(),
            retry_after_secs: None,
        }
    }

    /// Shorthand for a rate-limit error with a retry hint in seconds.
    pub fn rate_limited_after(message: impl Into<String>, retry_after_secs: u64) -> Self {
        CoreError::RateLimited {
            message: message.into(),
            retry_after_secs: Some(retry_after_secs),
        }
    }
}
