//! Handler for `GET /api/styles`: the active catalog for the picker UI.

use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use barberlab_core::selection::ColorScope;
use barberlab_db::models::catalog::ColorOption;
use barberlab_db::repositories::{CatalogRepo, SessionRepo};

use crate::error::AppResult;
use crate::middleware::session::{ActiveSession, ClientMeta};
use crate::state::AppState;
use crate::storage::MediaStore;

fn color_payload(colors: &[ColorOption]) -> Vec<serde_json::Value> {
    colors
        .iter()
        .map(|color| {
            json!({
                "id": color.id,
                "name": color.name,
                "hex_code": color.hex_code,
            })
        })
        .collect()
}

/// GET /api/styles
pub async fn styles(
    State(state): State<AppState>,
    ActiveSession(session): ActiveSession,
    meta: ClientMeta,
) -> AppResult<Response> {
    let styles = CatalogRepo::list_active_styles(&state.pool).await?;
    let beard_styles = CatalogRepo::list_active_beard_styles(&state.pool).await?;
    let hair_colors = CatalogRepo::list_active_colors(&state.pool, ColorScope::Hair).await?;
    let beard_colors = CatalogRepo::list_active_colors(&state.pool, ColorScope::Beard).await?;

    SessionRepo::touch(&state.pool, session.id, &meta.ip, &meta.user_agent).await?;

    let style_payload: Vec<_> = styles
        .iter()
        .map(|style| {
            json!({
                "id": style.id,
                "name": style.name,
                "image_url": MediaStore::url(&style.image_path),
            })
        })
        .collect();
    let beard_payload: Vec<_> = beard_styles
        .iter()
        .map(|style| {
            json!({
                "id": style.id,
                "name": style.name,
                "image_url": MediaStore::url(&style.image_path),
            })
        })
        .collect();

    let mut response = axum::Json(json!({
        "ok": true,
        "styles": style_payload,
        "beard_styles": beard_payload,
        "hair_colors": color_payload(&hair_colors),
        "beard_colors": color_payload(&beard_colors),
        "has_selfie": session.has_selfie(),
        "expires_at": session.expires_at.to_rfc3339(),
    }))
    .into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    Ok(response)
}
