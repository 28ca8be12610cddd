//! Repository for the `rate_limit_events` table.

use barberlab_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

pub struct RateLimitRepo;

impl RateLimitRepo {
    /// Append one event. Silently skipped when the client IP is unknown
    /// -- an event that cannot be counted later is useless.
    pub async fn record(
        pool: &PgPool,
        action: &str,
        ip_address: &str,
        session_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        if ip_address.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO rate_limit_events (action, ip_address, session_id) VALUES ($1, $2, $3)",
        )
        .bind(action)
        .bind(ip_address)
        .bind(session_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// In-transaction variant of [`RateLimitRepo::record`].
    pub async fn record_in_tx(
        conn: &mut PgConnection,
        action: &str,
        ip_address: &str,
        session_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        if ip_address.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO rate_limit_events (action, ip_address, session_id) VALUES ($1, $2, $3)",
        )
        .bind(action)
        .bind(ip_address)
        .bind(session_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Count events for an action/IP pair at or after `window_start`.
    pub async fn count_recent(
        pool: &PgPool,
        action: &str,
        ip_address: &str,
        window_start: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rate_limit_events
             WHERE action = $1 AND ip_address = $2 AND created_at >= $3",
        )
        .bind(action)
        .bind(ip_address)
        .bind(window_start)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// In-transaction variant of [`RateLimitRepo::count_recent`] -- the
    /// generate-path check runs under the session lock.
    pub async fn count_recent_in_tx(
        conn: &mut PgConnection,
        action: &str,
        ip_address: &str,
        window_start: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rate_limit_events
             WHERE action = $1 AND ip_address = $2 AND created_at >= $3",
        )
        .bind(action)
        .bind(ip_address)
        .bind(window_start)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// Delete events older than the cutoff or tied to reaped sessions.
    pub async fn delete_stale(
        pool: &PgPool,
        cutoff: Timestamp,
        expired_session_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM rate_limit_events WHERE created_at < $1 OR session_id = ANY($2)",
        )
        .bind(cutoff)
        .bind(expired_session_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
