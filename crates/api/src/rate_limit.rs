//! IP rate-limit policy over the append-only event log.
//!
//! Counts events for an (action, IP) pair within the trailing hour. A
//! non-positive limit disables the check entirely, and an unknown
//! client IP cannot be limited (its events were never recorded either).

use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};

use barberlab_db::repositories::RateLimitRepo;

/// Start of the trailing counting window.
fn window_start() -> chrono::DateTime<Utc> {
    Utc::now() - Duration::hours(1)
}

pub async fn is_ip_rate_limited(
    pool: &PgPool,
    action: &str,
    ip: &str,
    limit_per_hour: i64,
) -> Result<bool, sqlx::Error> {
    if ip.is_empty() || limit_per_hour <= 0 {
        return Ok(false);
    }
    let count = RateLimitRepo::count_recent(pool, action, ip, window_start()).await?;
    Ok(count >= limit_per_hour)
}

/// In-transaction variant: the generate-path check runs while the
/// session row lock is held.
pub async fn is_ip_rate_limited_in_tx(
    conn: &mut PgConnection,
    action: &str,
    ip: &str,
    limit_per_hour: i64,
) -> Result<bool, sqlx::Error> {
    if ip.is_empty() || limit_per_hour <= 0 {
        return Ok(false);
    }
    let count =
        RateLimitRepo::count_recent_in_tx(conn, action, ip, window_start()).await?;
    Ok(count >= limit_per_hour)
}
