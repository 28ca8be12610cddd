//! Handler for `GET /`: the kiosk home page.
//!
//! Server-rendered HTML: without an active session it answers 401 with
//! a rescan challenge and clears the cookie; with one it shows the
//! catalog and the session's recent previews.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use barberlab_core::selection::ColorScope;
use barberlab_db::models::generation::GenerationDetail;
use barberlab_db::repositories::{CatalogRepo, GenerationRepo, SessionRepo};

use crate::client_ip::{client_ip, user_agent};
use crate::cookies::clear_cookie;
use crate::error::AppResult;
use crate::middleware::session::resolve_session;
use crate::state::AppState;
use crate::storage::MediaStore;

/// Recent previews shown on the home page.
const RECENT_GENERATIONS_LIMIT: i64 = 8;

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn no_store(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

fn session_required_page(state: &AppState) -> Response {
    let minutes = state.config.playground.session_duration_minutes;
    let body = format!(
        "<!doctype html><html><head><title>Session required</title></head><body>\
         <h1>Session expired</h1>\
         <p>Scan the QR code again to start a new {minutes}-minute session.</p>\
         <p><a href=\"/start\">Start a session</a></p>\
         </body></html>"
    );
    let mut response = (StatusCode::UNAUTHORIZED, Html(body)).into_response();
    if let Ok(value) =
        HeaderValue::from_str(&clear_cookie(&state.config.playground.cookie_name))
    {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    no_store(response)
}

fn preview_list(generations: &[GenerationDetail]) -> String {
    generations
        .iter()
        .filter_map(|generation| {
            let result = generation.result_path.as_deref()?;
            let label = generation
                .style_name
                .as_deref()
                .unwrap_or("Custom style");
            Some(format!(
                "<li><img src=\"{}\" alt=\"{}\" width=\"160\"></li>",
                MediaStore::url(result),
                escape_html(label)
            ))
        })
        .collect()
}

/// GET /
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let Some(session) = resolve_session(&state, &headers).await? else {
        return Ok(session_required_page(&state));
    };

    SessionRepo::touch(
        &state.pool,
        session.id,
        &client_ip(&headers),
        &user_agent(&headers),
    )
    .await?;

    let styles = CatalogRepo::list_active_styles(&state.pool).await?;
    let beard_styles = CatalogRepo::list_active_beard_styles(&state.pool).await?;
    let hair_colors = CatalogRepo::list_active_colors(&state.pool, ColorScope::Hair).await?;
    let beard_colors = CatalogRepo::list_active_colors(&state.pool, ColorScope::Beard).await?;
    let recent =
        GenerationRepo::recent_succeeded(&state.pool, session.id, RECENT_GENERATIONS_LIMIT)
            .await?;

    let style_items: String = styles
        .iter()
        .map(|style| {
            format!(
                "<li data-style-id=\"{}\"><img src=\"{}\" alt=\"{}\" width=\"120\"></li>",
                style.id,
                MediaStore::url(&style.image_path),
                escape_html(style.name.as_deref().unwrap_or("Untitled style")),
            )
        })
        .collect();
    let beard_items: String = beard_styles
        .iter()
        .map(|style| {
            format!(
                "<li data-beard-style-id=\"{}\"><img src=\"{}\" alt=\"{}\" width=\"120\"></li>",
                style.id,
                MediaStore::url(&style.image_path),
                escape_html(style.name.as_deref().unwrap_or("Untitled beard style")),
            )
        })
        .collect();
    let color_items = |colors: &[barberlab_db::models::catalog::ColorOption]| -> String {
        colors
            .iter()
            .map(|color| {
                format!(
                    "<li data-color-id=\"{}\" style=\"background:{}\">{}</li>",
                    color.id,
                    escape_html(&color.hex_code),
                    escape_html(&color.name),
                )
            })
            .collect()
    };

    let body = format!(
        "<!doctype html><html><head><title>AI Playground</title></head><body>\
         <h1>Try a new look</h1>\
         <p>Session expires at {expires}. Generations used: {count}.</p>\
         <h2>Hairstyles</h2><ul class=\"styles\">{styles}</ul>\
         <h2>Beard styles</h2><ul class=\"beard-styles\">{beards}</ul>\
         <h2>Hair colors</h2><ul class=\"hair-colors\">{hair_colors}</ul>\
         <h2>Beard colors</h2><ul class=\"beard-colors\">{beard_colors}</ul>\
         <h2>Your previews</h2><ul class=\"previews\">{previews}</ul>\
         </body></html>",
        expires = session.expires_at.to_rfc3339(),
        count = session.generation_count,
        styles = style_items,
        beards = beard_items,
        hair_colors = color_items(&hair_colors),
        beard_colors = color_items(&beard_colors),
        previews = preview_list(&recent),
    );

    Ok(no_store(Html(body).into_response()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escaping_covers_the_usual_suspects() {
        assert_eq!(
            escape_html("<b>\"Fade\" & co</b>"),
            "&lt;b&gt;&quot;Fade&quot; &amp; co&lt;/b&gt;"
        );
    }
}
