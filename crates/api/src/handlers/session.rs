//! Handler for `GET /start`: issue an anonymous session.

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};

use barberlab_core::error::CoreError;
use barberlab_core::generation::actions;
use barberlab_core::session::new_session_token;
use barberlab_core::token::sign_token;
use barberlab_db::models::session::CreateSession;
use barberlab_db::repositories::{RateLimitRepo, SessionRepo};

use crate::cookies::session_cookie;
use crate::error::AppResult;
use crate::middleware::session::ClientMeta;
use crate::rate_limit::is_ip_rate_limited;
use crate::state::AppState;

/// GET /start
///
/// Rate-limits session starts per IP, creates the session row, records
/// the start event, and redirects to the home page with the signed
/// session cookie set.
pub async fn start(State(state): State<AppState>, meta: ClientMeta) -> AppResult<Response> {
    let playground = &state.config.playground;

    if is_ip_rate_limited(
        &state.pool,
        actions::START,
        &meta.ip,
        playground.start_max_per_ip_per_hour,
    )
    .await?
    {
        return Err(CoreError::rate_limited_after(
            "Too many session starts from this network. Please wait and retry.",
            60,
        )
        .into());
    }

    let now = Utc::now();
    let session = SessionRepo::create(
        &state.pool,
        &CreateSession {
            token: new_session_token(),
            expires_at: now + Duration::minutes(playground.session_duration_minutes),
            last_ip: meta.ip.clone(),
            user_agent: meta.user_agent.clone(),
        },
    )
    .await?;

    RateLimitRepo::record(&state.pool, actions::START, &meta.ip, Some(session.id)).await?;

    let cookie = session_cookie(
        &playground.cookie_name,
        &sign_token(&session.token, now, playground.signing_key.as_bytes()),
        playground.session_max_age_secs(),
        playground.cookie_secure,
    );

    let mut response = (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, HeaderValue::from_static("/"))],
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    Ok(response)
}
