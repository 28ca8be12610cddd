//! Repository for the `playground_sessions` table.

use barberlab_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::session::{CreateSession, PlaygroundSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token, started_at, expires_at, last_seen_at, revoked_at, \
                       selfie_path, selfie_uploaded_at, generation_count, \
                       last_generation_at, last_ip, user_agent";

pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSession,
    ) -> Result<PlaygroundSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO playground_sessions (token, expires_at, last_ip, user_agent)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlaygroundSession>(&query)
            .bind(&input.token)
            .bind(input.expires_at)
            .bind(&input.last_ip)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Look up a session by its opaque token. Activity is the caller's
    /// check -- the cookie layer needs to distinguish "unknown" from
    /// "expired" only for logging, never for the client.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<PlaygroundSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playground_sessions WHERE token = $1");
        sqlx::query_as::<_, PlaygroundSession>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Update last-seen bookkeeping. Empty ip/user_agent leave the
    /// previous value in place.
    pub async fn touch(
        pool: &PgPool,
        id: DbId,
        ip: &str,
        user_agent: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE playground_sessions
             SET last_seen_at = NOW(),
                 last_ip = CASE WHEN $2 <> '' THEN $2 ELSE last_ip END,
                 user_agent = CASE WHEN $3 <> '' THEN LEFT($3, 255) ELSE user_agent END
             WHERE id = $1",
        )
        .bind(id)
        .bind(ip)
        .bind(user_agent)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Store a newly uploaded selfie reference.
    pub async fn set_selfie(
        pool: &PgPool,
        id: DbId,
        selfie_path: &str,
        uploaded_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE playground_sessions
             SET selfie_path = $2, selfie_uploaded_at = $3, last_seen_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(selfie_path)
        .bind(uploaded_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Acquire the row-level exclusive lock on a session.
    ///
    /// Must run inside a transaction; the lock is held until commit or
    /// rollback. Concurrent generation attempts for the same session
    /// serialize here, so the quota check and counter bump cannot race.
    pub async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<PlaygroundSession, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playground_sessions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, PlaygroundSession>(&query)
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Bump the generation counter and stamp the generation time.
    /// Runs on the locked row; returns the new counter value.
    pub async fn record_generation(
        conn: &mut PgConnection,
        id: DbId,
        at: Timestamp,
    ) -> Result<i32, sqlx::Error> {
        let (count,): (i32,) = sqlx::query_as(
            "UPDATE playground_sessions
             SET generation_count = generation_count + 1,
                 last_generation_at = $2,
                 last_seen_at = $2
             WHERE id = $1
             RETURNING generation_count",
        )
        .bind(id)
        .bind(at)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// In-transaction variant of [`SessionRepo::touch`].
    pub async fn touch_in_tx(
        conn: &mut PgConnection,
        id: DbId,
        ip: &str,
        user_agent: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE playground_sessions
             SET last_seen_at = NOW(),
                 last_ip = CASE WHEN $2 <> '' THEN $2 ELSE last_ip END,
                 user_agent = CASE WHEN $3 <> '' THEN LEFT($3, 255) ELSE user_agent END
             WHERE id = $1",
        )
        .bind(id)
        .bind(ip)
        .bind(user_agent)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Sessions whose expiry lies before the retention cutoff, with the
    /// selfie file each one owns. Consumed by the retention sweep.
    pub async fn expired_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<(DbId, Option<String>)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, Option<String>)>(
            "SELECT id, selfie_path FROM playground_sessions WHERE expires_at < $1",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    /// Delete sessions by id. Returns the number of deleted rows.
    pub async fn delete_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM playground_sessions WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
