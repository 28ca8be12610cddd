//! Playground session extractors.
//!
//! [`ActiveSession`] resolves the signed session cookie to a live
//! session row. Every failure mode -- missing cookie, bad signature,
//! over-age value, unknown token, revoked or expired session --
//! collapses into the same 401 rejection, which also clears the cookie.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;

use barberlab_core::token::verify_token;
use barberlab_db::models::session::PlaygroundSession;
use barberlab_db::repositories::SessionRepo;

use crate::client_ip::{client_ip, user_agent};
use crate::cookies::read_cookie;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated (active) playground session.
#[derive(Debug, Clone)]
pub struct ActiveSession(pub PlaygroundSession);

/// Client metadata recorded on session touches and rate-limit events.
#[derive(Debug, Clone)]
pub struct ClientMeta {
    pub ip: String,
    pub user_agent: String,
}

/// Resolve the session cookie against the database.
///
/// Returns `None` for anything short of a live session; callers decide
/// whether that is a JSON 401 (API) or an HTML challenge (home page).
pub async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<PlaygroundSession>, sqlx::Error> {
    let playground = &state.config.playground;
    let Some(raw) = read_cookie(headers, &playground.cookie_name) else {
        return Ok(None);
    };
    let Some(token) = verify_token(
        &raw,
        playground.signing_key.as_bytes(),
        playground.session_max_age_secs(),
        Utc::now(),
    ) else {
        return Ok(None);
    };
    let Some(session) = SessionRepo::find_by_token(&state.pool, &token).await? else {
        return Ok(None);
    };
    if !session.is_active(Utc::now()) {
        return Ok(None);
    }
    Ok(Some(session))
}

impl FromRequestParts<AppState> for ActiveSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(state, &parts.headers).await? {
            Some(session) => Ok(ActiveSession(session)),
            None => Err(AppError::SessionRequired {
                cookie_name: state.config.playground.cookie_name.clone(),
            }),
        }
    }
}

impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientMeta {
            ip: client_ip(&parts.headers),
            user_agent: user_agent(&parts.headers),
        })
    }
}
