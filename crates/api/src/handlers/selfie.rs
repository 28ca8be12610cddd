//! Handler for `POST /api/selfie`: upload or replace the session selfie.

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use barberlab_core::error::CoreError;
use barberlab_core::media::{extension_from_mime, validate_upload};
use barberlab_db::repositories::SessionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::session::{ActiveSession, ClientMeta};
use crate::state::AppState;
use crate::storage::MediaStore;

/// POST /api/selfie (multipart, field `image`)
pub async fn upload(
    State(state): State<AppState>,
    ActiveSession(session): ActiveSession,
    meta: ClientMeta,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let playground = &state.config.playground;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?
    {
        if field.name() == Some("image") {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
            validate_upload(
                content_type.as_deref(),
                bytes.len(),
                playground.max_image_size_bytes,
            )?;
            // validate_upload guarantees a known content type here.
            let extension = extension_from_mime(content_type.as_deref().unwrap_or(""));
            upload = Some((extension.to_string(), bytes.to_vec()));
        }
    }
    let Some((extension, bytes)) = upload else {
        return Err(CoreError::Validation("No image was provided.".into()).into());
    };

    let selfie_path = state
        .media
        .save("selfies", &extension, &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store selfie: {e}")))?;

    // Replace, then drop the superseded file.
    let previous = session.selfie_path.clone();
    let uploaded_at = Utc::now();
    SessionRepo::set_selfie(&state.pool, session.id, &selfie_path, uploaded_at).await?;
    SessionRepo::touch(&state.pool, session.id, &meta.ip, &meta.user_agent).await?;
    if let Some(previous) = previous {
        state.media.delete(&previous).await;
    }

    let mut response = axum::Json(json!({
        "ok": true,
        "selfie": {
            "url": MediaStore::url(&selfie_path),
            "uploaded_at": uploaded_at.to_rfc3339(),
        },
        "expires_at": session.expires_at.to_rfc3339(),
    }))
    .into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    Ok(response)
}
