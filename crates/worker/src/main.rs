//! Retention sweep for the AI playground.
//!
//! Deletes sessions whose expiry is older than the retention cutoff,
//! generations past the cutoff or belonging to those sessions, stale
//! rate-limit events, and every stored image file the deleted rows
//! reference. Runs once per invocation; schedule it from cron.
//!
//! Environment:
//! - `DATABASE_URL` (required)
//! - `PLAYGROUND_DATA_RETENTION_HOURS` (default `24`, minimum `1`)
//! - `PLAYGROUND_MEDIA_ROOT` (default `./media`)
//!
//! Pass `--dry-run` to log what would be deleted without touching
//! anything.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use barberlab_db::repositories::{GenerationRepo, RateLimitRepo, SessionRepo};

async fn delete_file(media_root: &Path, relative: &str) {
    if relative.is_empty() {
        return;
    }
    let absolute = media_root.join(relative);
    if let Err(err) = tokio::fs::remove_file(&absolute).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %absolute.display(), error = %err, "Failed to delete media file");
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barberlab_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dry_run = std::env::args().any(|arg| arg == "--dry-run");
    let retention_hours: i64 = std::env::var("PLAYGROUND_DATA_RETENTION_HOURS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(24)
        .max(1);
    let media_root = PathBuf::from(
        std::env::var("PLAYGROUND_MEDIA_ROOT").unwrap_or_else(|_| "./media".into()),
    );

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = barberlab_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    let cutoff = Utc::now() - Duration::hours(retention_hours);

    let expired_sessions = SessionRepo::expired_before(&pool, cutoff)
        .await
        .expect("Failed to query expired sessions");
    let expired_session_ids: Vec<i64> = expired_sessions.iter().map(|(id, _)| *id).collect();

    let stale_generations = GenerationRepo::stale_before(&pool, cutoff, &expired_session_ids)
        .await
        .expect("Failed to query stale generations");

    tracing::info!(
        cutoff = %cutoff,
        retention_hours,
        sessions = expired_sessions.len(),
        generations = stale_generations.len(),
        dry_run,
        "Playground retention sweep"
    );

    if dry_run {
        return;
    }

    for generation in &stale_generations {
        delete_file(&media_root, &generation.selfie_path).await;
        if let Some(path) = &generation.custom_style_path {
            delete_file(&media_root, path).await;
        }
        if let Some(path) = &generation.result_path {
            delete_file(&media_root, path).await;
        }
    }
    let generation_ids: Vec<i64> = stale_generations.iter().map(|g| g.id).collect();
    let deleted_generations = GenerationRepo::delete_by_ids(&pool, &generation_ids)
        .await
        .expect("Failed to delete stale generations");

    for (_, selfie_path) in &expired_sessions {
        if let Some(path) = selfie_path {
            delete_file(&media_root, path).await;
        }
    }
    let deleted_events = RateLimitRepo::delete_stale(&pool, cutoff, &expired_session_ids)
        .await
        .expect("Failed to delete stale rate-limit events");
    let deleted_sessions = SessionRepo::delete_by_ids(&pool, &expired_session_ids)
        .await
        .expect("Failed to delete expired sessions");

    tracing::info!(
        deleted_generations,
        deleted_sessions,
        deleted_events,
        "Playground retention sweep complete"
    );
}
