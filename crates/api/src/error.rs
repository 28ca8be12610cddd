//! Application-level error type for HTTP handlers.
//!
//! Wraps [`CoreError`] for domain errors, [`sqlx::Error`] for database
//! failures, and [`ProviderError`] for generation failures. Implements
//! [`IntoResponse`] to produce the `{ok: false, error}` JSON envelope
//! with the status, headers, and cookie handling each error class
//! demands.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use barberlab_core::error::CoreError;
use barberlab_providers::ProviderError;

use crate::cookies;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `barberlab_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Missing/forged/expired session cookie. Carries the cookie name
    /// so the 401 response can clear it.
    #[error("Session required")]
    SessionRequired { cookie_name: String },

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A provider failure during generation. The client sees a generic
    /// message; the raw error is only included when `show_details` is
    /// set (debug deployments).
    #[error("Provider error: {error}")]
    Provider {
        error: ProviderError,
        provider: String,
        show_details: bool,
    },

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Message shown when the session cookie does not resolve.
pub const SESSION_REQUIRED_MESSAGE: &str = "Session expired. Scan the QR code again.";

/// Generic client-facing message for any provider failure.
pub const GENERATION_FAILED_MESSAGE: &str = "Generation failed. Please retry in a moment.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => error_response(
                    StatusCode::NOT_FOUND,
                    format!("Selected {entity} is unavailable."),
                ),
                CoreError::Validation(msg) => {
                    error_response(StatusCode::BAD_REQUEST, msg.clone())
                }
                CoreError::Conflict(msg) => error_response(StatusCode::CONFLICT, msg.clone()),
                CoreError::RateLimited {
                    message,
                    retry_after_secs,
                } => {
                    let mut response =
                        error_response(StatusCode::TOO_MANY_REQUESTS, message.clone());
                    if let Some(secs) = (*retry_after_secs).filter(|s| *s > 0) {
                        if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                            response.headers_mut().insert(header::RETRY_AFTER, value);
                        }
                    }
                    response
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal_error_response()
                }
            },

            AppError::SessionRequired { cookie_name } => {
                let mut response = error_response(
                    StatusCode::UNAUTHORIZED,
                    SESSION_REQUIRED_MESSAGE.to_string(),
                );
                if let Ok(value) = HeaderValue::from_str(&cookies::clear_cookie(cookie_name)) {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
                response
            }

            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                internal_error_response()
            }

            AppError::Provider {
                error,
                provider,
                show_details,
            } => {
                let details = if *show_details {
                    error.to_string()
                } else {
                    String::new()
                };
                let body = json!({
                    "ok": false,
                    "error": GENERATION_FAILED_MESSAGE,
                    "provider": provider,
                    "details": details,
                });
                (StatusCode::BAD_GATEWAY, axum::Json(body)).into_response()
            }

            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error_response()
            }
        };

        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        );
        response
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body = json!({"ok": false, "error": message});
    (status, axum::Json(body)).into_response()
}

fn internal_error_response() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "An internal error occurred.".to_string(),
    )
}
