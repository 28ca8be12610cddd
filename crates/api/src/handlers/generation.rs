//! Handler for `POST /api/generate`: the generation orchestrator.
//!
//! Request flow: parse and validate the form -> resolve catalog rows ->
//! then, inside one transaction holding the session row lock: dedup
//! cache check (hits return the prior preview and bypass every quota),
//! IP rate limit, session quota, cooldown, one-style-per-session
//! conflict, counter bump, pending record, rate-limit event. The lock
//! is released at commit, *before* the provider call -- a slow upstream
//! must not serialize other visitors' requests. The provider outcome
//! then finalizes the record as succeeded or failed.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use barberlab_core::error::CoreError;
use barberlab_core::generation::{actions, StyleSource};
use barberlab_core::hashing::sha256_hex;
use barberlab_core::media::{extension_from_mime, validate_upload};
use barberlab_core::selection::{
    check_beard_color_requires_style, check_required_choices, check_style_source, Choice,
    ColorScope,
};
use barberlab_db::models::catalog::{BeardStyle, ColorOption, HairStyle};
use barberlab_db::models::generation::{CreateGeneration, GenerationDetail};
use barberlab_db::repositories::{CatalogRepo, GenerationRepo, RateLimitRepo, SessionRepo};
use barberlab_providers::{build_provider, GenerateRequest};

use crate::error::{AppError, AppResult};
use crate::middleware::session::{ActiveSession, ClientMeta};
use crate::rate_limit::is_ip_rate_limited_in_tx;
use crate::state::AppState;
use crate::storage::MediaStore;

/// Parsed multipart form for a generation request.
#[derive(Debug, Default)]
struct GenerateForm {
    style_id: Option<String>,
    hair_color: Option<String>,
    beard_style: Option<String>,
    beard_color: Option<String>,
    custom_style: Option<(String, Vec<u8>)>,
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateForm, AppError> {
    let mut form = GenerateForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "custom_style_image" => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
                // A file input submitted with no selection arrives as an
                // empty part; that is "no custom style", not an upload.
                if bytes.is_empty() {
                    continue;
                }
                form.custom_style =
                    Some((content_type.unwrap_or_default(), bytes.to_vec()));
            }
            "style_id" | "hair_color_option_id" | "beard_style_id" | "beard_color_option_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
                match name.as_str() {
                    "style_id" => form.style_id = Some(value),
                    "hair_color_option_id" => form.hair_color = Some(value),
                    "beard_style_id" => form.beard_style = Some(value),
                    _ => form.beard_color = Some(value),
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Everything resolved against the catalog before the transaction.
struct ResolvedSelection {
    style: Option<HairStyle>,
    beard_style: Option<BeardStyle>,
    hair_color: Option<ColorOption>,
    beard_color: Option<ColorOption>,
    custom_style: Option<(String, Vec<u8>)>,
    custom_fingerprint: String,
}

impl ResolvedSelection {
    fn source(&self) -> StyleSource {
        match &self.style {
            Some(style) => StyleSource::Curated(style.id),
            None => StyleSource::Custom {
                fingerprint: self.custom_fingerprint.clone(),
            },
        }
    }
}

async fn resolve_selection(
    state: &AppState,
    form: GenerateForm,
) -> Result<ResolvedSelection, AppError> {
    let hair_color_choice = Choice::parse(form.hair_color.as_deref(), "hair color")?;
    let beard_style_choice = Choice::parse(form.beard_style.as_deref(), "beard style")?;
    let beard_color_choice = Choice::parse(form.beard_color.as_deref(), "beard color")?;
    check_required_choices(hair_color_choice, beard_style_choice, beard_color_choice)?;
    check_beard_color_requires_style(beard_style_choice, beard_color_choice)?;

    let style_id_raw = form
        .style_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());
    check_style_source(style_id_raw.is_some(), form.custom_style.is_some())?;

    let style = match style_id_raw {
        Some(raw) => {
            let style_id: i64 = raw.parse().map_err(|_| {
                AppError::Core(CoreError::Validation("Invalid hairstyle selection.".into()))
            })?;
            let style = CatalogRepo::find_active_style(&state.pool, style_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "hairstyle",
                    id: style_id,
                }))?;
            Some(style)
        }
        None => None,
    };

    let hair_color = match hair_color_choice.id() {
        Some(id) => Some(
            CatalogRepo::find_active_color(&state.pool, id, ColorScope::Hair)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "hair color",
                    id,
                }))?,
        ),
        None => None,
    };

    let beard_style = match beard_style_choice.id() {
        Some(id) => Some(
            CatalogRepo::find_active_beard_style(&state.pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "beard style",
                    id,
                }))?,
        ),
        None => None,
    };

    let beard_color = match beard_color_choice.id() {
        Some(id) => Some(
            CatalogRepo::find_active_color(&state.pool, id, ColorScope::Beard)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "beard color",
                    id,
                }))?,
        ),
        None => None,
    };

    let mut custom_fingerprint = String::new();
    if let Some((content_type, bytes)) = &form.custom_style {
        validate_upload(
            Some(content_type.as_str()).filter(|ct| !ct.is_empty()),
            bytes.len(),
            state.config.playground.max_image_size_bytes,
        )?;
        custom_fingerprint = sha256_hex(bytes);
    }

    Ok(ResolvedSelection {
        style,
        beard_style,
        hair_color,
        beard_color,
        custom_style: form.custom_style,
        custom_fingerprint,
    })
}

fn generation_payload(
    detail: &GenerationDetail,
    session_generation_count: i32,
) -> serde_json::Value {
    json!({
        "id": detail.id,
        "status": detail.status,
        "provider": detail.provider,
        "created_at": detail.created_at.to_rfc3339(),
        "processing_ms": detail.processing_ms,
        "session_generation_count": session_generation_count,
        "source": detail.source(),
        "style_name": detail.style_name.clone().unwrap_or_default(),
        "beard_style_name": detail.beard_style_name.clone().unwrap_or_default(),
        "hair_color_name": detail.hair_color_name.clone().unwrap_or_default(),
        "beard_color_name": detail.beard_color_name.clone().unwrap_or_default(),
        "result_url": detail.result_path.as_deref().map(MediaStore::url).unwrap_or_default(),
    })
}

fn no_store_json(body: serde_json::Value) -> Response {
    let mut response = axum::Json(body).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

/// POST /api/generate
pub async fn generate(
    State(state): State<AppState>,
    ActiveSession(session): ActiveSession,
    meta: ClientMeta,
    multipart: Multipart,
) -> AppResult<Response> {
    let playground = &state.config.playground;

    if !session.has_selfie() {
        return Err(CoreError::Validation("Upload a selfie first.".into()).into());
    }

    let form = read_form(multipart).await?;
    let selection = resolve_selection(&state, form).await?;
    let source = selection.source();

    // -- Locked section: cache check, limits, counter, pending record --
    let mut tx = state.pool.begin().await?;
    let locked = SessionRepo::lock(&mut tx, session.id).await?;
    let selfie_path = locked.selfie_path.clone().unwrap_or_default();

    let reusable = GenerationRepo::find_reusable(
        &mut tx,
        locked.id,
        &source,
        selection.beard_style.as_ref().map(|b| b.id),
        selection.hair_color.as_ref().map(|c| c.id),
        selection.beard_color.as_ref().map(|c| c.id),
        &selfie_path,
    )
    .await?;
    if let Some(existing) = reusable {
        // Cache hit: no provider call, no quota increment, no event.
        SessionRepo::touch_in_tx(&mut tx, locked.id, &meta.ip, &meta.user_agent).await?;
        tx.commit().await?;

        let detail = GenerationRepo::detail(&state.pool, existing.id)
            .await?
            .ok_or_else(|| AppError::Internal("Reused generation vanished".into()))?;
        return Ok(no_store_json(json!({
            "ok": true,
            "reused": true,
            "message": "Using existing preview from this session.",
            "generation": generation_payload(&detail, locked.generation_count),
        })));
    }

    if is_ip_rate_limited_in_tx(
        &mut tx,
        actions::GENERATE,
        &meta.ip,
        playground.generate_max_per_ip_per_hour,
    )
    .await?
    {
        return Err(CoreError::rate_limited_after(
            "Generation rate limit reached on this network. Please try again shortly.",
            60,
        )
        .into());
    }

    if locked.generation_count >= playground.session_generation_limit {
        return Err(CoreError::rate_limited(
            "Session generation quota reached. Please rescan the QR code for a new session.",
        )
        .into());
    }

    if playground.min_generate_interval_seconds > 0 {
        if let Some(last) = locked.last_generation_at {
            let elapsed = (Utc::now() - last).num_seconds();
            if elapsed < playground.min_generate_interval_seconds {
                let retry_after =
                    (playground.min_generate_interval_seconds - elapsed).max(1) as u64;
                return Err(CoreError::rate_limited_after(
                    "Please wait a few seconds before starting another generation.",
                    retry_after,
                )
                .into());
            }
        }
    }

    if playground.one_style_per_session {
        if let Some(style) = &selection.style {
            let already_used = GenerationRepo::find_prior_success(
                &mut tx,
                locked.id,
                style.id,
                selection.beard_style.as_ref().map(|b| b.id),
                selection.hair_color.as_ref().map(|c| c.id),
                selection.beard_color.as_ref().map(|c| c.id),
                &selfie_path,
            )
            .await?;
            if already_used.is_some() {
                return Err(CoreError::Conflict(
                    "This style was already used, but no reusable preview is available."
                        .into(),
                )
                .into());
            }
        }
    }

    SessionRepo::touch_in_tx(&mut tx, locked.id, &meta.ip, &meta.user_agent).await?;
    let generation_count = SessionRepo::record_generation(&mut tx, locked.id, Utc::now()).await?;

    let custom_style_path = match &selection.custom_style {
        Some((content_type, bytes)) => {
            let extension = extension_from_mime(content_type);
            let path = state
                .media
                .save("custom-styles", extension, bytes)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to store custom style: {e}")))?;
            Some(path)
        }
        None => None,
    };

    let generation = GenerationRepo::create_pending(
        &mut tx,
        &CreateGeneration {
            session_id: locked.id,
            style_id: selection.style.as_ref().map(|s| s.id),
            beard_style_id: selection.beard_style.as_ref().map(|b| b.id),
            hair_color_id: selection.hair_color.as_ref().map(|c| c.id),
            beard_color_id: selection.beard_color.as_ref().map(|c| c.id),
            selfie_path: selfie_path.clone(),
            custom_style_path: custom_style_path.clone(),
            custom_style_fingerprint: selection.custom_fingerprint.clone(),
            provider: state.config.playground.provider.provider.clone(),
        },
    )
    .await?;
    RateLimitRepo::record_in_tx(&mut tx, actions::GENERATE, &meta.ip, Some(locked.id)).await?;
    tx.commit().await?;
    // -- Lock released; the provider call happens outside it --

    let reference_path = match &selection.style {
        Some(style) => state.media.absolute(&style.image_path),
        None => state
            .media
            .absolute(custom_style_path.as_deref().unwrap_or_default()),
    };
    let request = GenerateRequest {
        selfie_path: state.media.absolute(&selfie_path).display().to_string(),
        reference_path: reference_path.display().to_string(),
        beard_reference_path: selection
            .beard_style
            .as_ref()
            .map(|b| state.media.absolute(&b.image_path).display().to_string()),
        hair_color_name: selection
            .hair_color
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        beard_color_name: selection
            .beard_color
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        style_description: selection
            .style
            .as_ref()
            .map(|s| s.description.clone())
            .unwrap_or_default(),
        apply_beard_edit: selection.beard_style.is_some(),
    };

    let started = Instant::now();
    let provider_config = &state.config.playground.provider;
    let outcome = match build_provider(provider_config) {
        Ok(provider) => provider.generate(&request).await,
        Err(err) => Err(err),
    };
    let processing_ms = started.elapsed().as_millis().min(i32::MAX as u128) as i32;

    match outcome {
        Ok(output) => {
            let extension = extension_from_mime(&output.mime_type);
            let result_path = state
                .media
                .save("results", extension, &output.image_bytes)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to store result: {e}")))?;
            GenerationRepo::mark_succeeded(
                &state.pool,
                generation.id,
                &result_path,
                output.provider,
                processing_ms,
            )
            .await?;

            let detail = GenerationRepo::detail(&state.pool, generation.id)
                .await?
                .ok_or_else(|| AppError::Internal("Generation vanished".into()))?;
            Ok(no_store_json(json!({
                "ok": true,
                "message": "Generation completed.",
                "generation": generation_payload(&detail, generation_count),
            })))
        }
        Err(err) => {
            tracing::error!(
                generation_id = generation.id,
                provider = %provider_config.provider,
                error = %err,
                "Provider call failed"
            );
            GenerationRepo::mark_failed(&state.pool, generation.id, &err.to_string(), processing_ms)
                .await?;
            Err(AppError::Provider {
                error: err,
                provider: provider_config.provider.clone(),
                show_details: state.config.playground.debug,
            })
        }
    }
}
