//! Repository for the `generations` table.

use barberlab_core::generation::{GenerationStatus, StyleSource};
use barberlab_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::generation::{
    CreateGeneration, Generation, GenerationDetail, StaleGeneration,
};

const COLUMNS: &str = "id, session_id, style_id, beard_style_id, hair_color_id, beard_color_id, \
                       selfie_path, custom_style_path, custom_style_fingerprint, result_path, \
                       provider, status, processing_ms, error_message, created_at, updated_at";

/// Joined select used by [`GenerationRepo::detail`] and
/// [`GenerationRepo::recent_succeeded`].
const DETAIL_SELECT: &str = "SELECT g.id, g.session_id, g.style_id, g.status, g.provider, \
                             g.created_at, g.processing_ms, g.result_path, \
                             hs.name AS style_name, bs.name AS beard_style_name, \
                             hc.name AS hair_color_name, bc.name AS beard_color_name \
                             FROM generations g \
                             LEFT JOIN hair_styles hs ON hs.id = g.style_id \
                             LEFT JOIN beard_styles bs ON bs.id = g.beard_style_id \
                             LEFT JOIN color_options hc ON hc.id = g.hair_color_id \
                             LEFT JOIN color_options bc ON bc.id = g.beard_color_id";

/// The exact-selection match shared by the dedup-cache and
/// one-style-per-session queries. `IS NOT DISTINCT FROM` makes NULLs
/// (declined choices) compare equal.
const KEY_MATCH: &str = "session_id = $1 \
                         AND beard_style_id IS NOT DISTINCT FROM $2 \
                         AND hair_color_id IS NOT DISTINCT FROM $3 \
                         AND beard_color_id IS NOT DISTINCT FROM $4 \
                         AND selfie_path = $5 \
                         AND status = 'succeeded'";

pub struct GenerationRepo;

impl GenerationRepo {
    /// Insert a pending record. Runs on the session-locked transaction.
    pub async fn create_pending(
        conn: &mut PgConnection,
        input: &CreateGeneration,
    ) -> Result<Generation, sqlx::Error> {
        let query = format!(
            "INSERT INTO generations (session_id, style_id, beard_style_id, hair_color_id, \
                                      beard_color_id, selfie_path, custom_style_path, \
                                      custom_style_fingerprint, provider, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(input.session_id)
            .bind(input.style_id)
            .bind(input.beard_style_id)
            .bind(input.hair_color_id)
            .bind(input.beard_color_id)
            .bind(&input.selfie_path)
            .bind(&input.custom_style_path)
            .bind(&input.custom_style_fingerprint)
            .bind(&input.provider)
            .fetch_one(conn)
            .await
    }

    /// Find a prior succeeded generation with a stored result image that
    /// matches the full cache key. This is the dedup short-circuit: a
    /// hit means the visitor re-submitted identical choices and gets the
    /// existing preview back at no provider cost.
    #[allow(clippy::too_many_arguments)]
    pub async fn find_reusable(
        conn: &mut PgConnection,
        session_id: DbId,
        source: &StyleSource,
        beard_style_id: Option<DbId>,
        hair_color_id: Option<DbId>,
        beard_color_id: Option<DbId>,
        selfie_path: &str,
    ) -> Result<Option<Generation>, sqlx::Error> {
        let source_clause = match source {
            StyleSource::Curated(_) => "style_id = $6",
            StyleSource::Custom { .. } => "style_id IS NULL AND custom_style_fingerprint = $6",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM generations
             WHERE {KEY_MATCH}
               AND {source_clause}
               AND result_path IS NOT NULL AND result_path <> ''
             ORDER BY created_at DESC
             LIMIT 1"
        );
        let mut q = sqlx::query_as::<_, Generation>(&query)
            .bind(session_id)
            .bind(beard_style_id)
            .bind(hair_color_id)
            .bind(beard_color_id)
            .bind(selfie_path);
        q = match source {
            StyleSource::Curated(style_id) => q.bind(*style_id),
            StyleSource::Custom { fingerprint } => q.bind(fingerprint.clone()),
        };
        q.fetch_optional(conn).await
    }

    /// Find a prior succeeded generation for the same curated selection
    /// regardless of whether its result image still exists. Feeds the
    /// one-style-per-session conflict check.
    pub async fn find_prior_success(
        conn: &mut PgConnection,
        session_id: DbId,
        style_id: DbId,
        beard_style_id: Option<DbId>,
        hair_color_id: Option<DbId>,
        beard_color_id: Option<DbId>,
        selfie_path: &str,
    ) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generations
             WHERE {KEY_MATCH}
               AND style_id = $6
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(session_id)
            .bind(beard_style_id)
            .bind(hair_color_id)
            .bind(beard_color_id)
            .bind(selfie_path)
            .bind(style_id)
            .fetch_optional(conn)
            .await
    }

    /// Terminal transition to succeeded.
    pub async fn mark_succeeded(
        pool: &PgPool,
        id: DbId,
        result_path: &str,
        provider: &str,
        processing_ms: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generations
             SET status = $2, result_path = $3, provider = $4, processing_ms = $5,
                 error_message = '', updated_at = NOW()
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(GenerationStatus::Succeeded.as_str())
        .bind(result_path)
        .bind(provider)
        .bind(processing_ms)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminal transition to failed. The error text is truncated; full
    /// detail goes to the server log, not the row.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        error_message: &str,
        processing_ms: i32,
    ) -> Result<(), sqlx::Error> {
        let truncated: String = error_message.chars().take(255).collect();
        sqlx::query(
            "UPDATE generations
             SET status = $2, error_message = $3, processing_ms = $4, updated_at = NOW()
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(GenerationStatus::Failed.as_str())
        .bind(truncated)
        .bind(processing_ms)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// A single generation joined with catalog names for the payload.
    pub async fn detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GenerationDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE g.id = $1");
        sqlx::query_as::<_, GenerationDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Recent successful generations with stored results, newest first.
    pub async fn recent_succeeded(
        pool: &PgPool,
        session_id: DbId,
        limit: i64,
    ) -> Result<Vec<GenerationDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE g.session_id = $1 AND g.status = 'succeeded'
               AND g.result_path IS NOT NULL AND g.result_path <> ''
             ORDER BY g.created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, GenerationDetail>(&query)
            .bind(session_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Generations past the retention cutoff or belonging to expired
    /// sessions, with the files each one owns.
    pub async fn stale_before(
        pool: &PgPool,
        cutoff: Timestamp,
        expired_session_ids: &[DbId],
    ) -> Result<Vec<StaleGeneration>, sqlx::Error> {
        sqlx::query_as::<_, StaleGeneration>(
            "SELECT id, selfie_path, custom_style_path, result_path
             FROM generations
             WHERE created_at < $1 OR session_id = ANY($2)",
        )
        .bind(cutoff)
        .bind(expired_session_ids)
        .fetch_all(pool)
        .await
    }

    /// Delete generations by id. Returns the number of deleted rows.
    pub async fn delete_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM generations WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Total rows for a session, any status. Test and ops visibility.
    pub async fn count_for_session(pool: &PgPool, session_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM generations WHERE session_id = $1")
                .bind(session_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
