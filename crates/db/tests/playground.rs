//! Integration tests for the playground repositories:
//! - Session lifecycle and the activity window
//! - Generation dedup-key matching (curated, custom, NULL choices)
//! - Terminal status transitions
//! - Rate-limit event counting
//! - Retention sweep queries

use chrono::{Duration, Utc};
use sqlx::PgPool;

use barberlab_core::generation::{actions, StyleSource};
use barberlab_core::selection::ColorScope;
use barberlab_db::models::catalog::{CreateBeardStyle, CreateColorOption, CreateHairStyle};
use barberlab_db::models::generation::CreateGeneration;
use barberlab_db::models::session::CreateSession;
use barberlab_db::repositories::{
    CatalogRepo, GenerationRepo, RateLimitRepo, SessionRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_session(token: &str) -> CreateSession {
    CreateSession {
        token: token.to_string(),
        expires_at: Utc::now() + Duration::minutes(30),
        last_ip: "203.0.113.9".to_string(),
        user_agent: "kiosk".to_string(),
    }
}

fn new_style(name: &str, active: bool) -> CreateHairStyle {
    CreateHairStyle {
        name: Some(name.to_string()),
        description: String::new(),
        image_path: format!("styles/{name}.jpg"),
        is_active: active,
        sort_order: 0,
    }
}

fn new_generation(session_id: i64, style_id: Option<i64>, selfie: &str) -> CreateGeneration {
    CreateGeneration {
        session_id,
        style_id,
        beard_style_id: None,
        hair_color_id: None,
        beard_color_id: None,
        selfie_path: selfie.to_string(),
        custom_style_path: None,
        custom_style_fingerprint: String::new(),
        provider: "stub".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_create_find_and_activity(pool: PgPool) {
    let session = SessionRepo::create(&pool, &new_session("tok-alpha"))
        .await
        .unwrap();
    assert_eq!(session.generation_count, 0);
    assert!(session.is_active(Utc::now()));
    assert!(!session.has_selfie());

    let found = SessionRepo::find_by_token(&pool, "tok-alpha")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, session.id);

    assert!(SessionRepo::find_by_token(&pool, "tok-unknown")
        .await
        .unwrap()
        .is_none());

    // One second past expiry the session is no longer active.
    assert!(!found.is_active(found.expires_at + Duration::seconds(1)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn touch_preserves_fields_on_empty_values(pool: PgPool) {
    let session = SessionRepo::create(&pool, &new_session("tok-touch"))
        .await
        .unwrap();

    SessionRepo::touch(&pool, session.id, "", "").await.unwrap();
    let after = SessionRepo::find_by_token(&pool, "tok-touch")
        .await
        .unwrap()
        .unwrap();
    assert!(after.last_seen_at.is_some());
    assert_eq!(after.last_ip, "203.0.113.9");
    assert_eq!(after.user_agent, "kiosk");

    SessionRepo::touch(&pool, session.id, "198.51.100.2", "phone")
        .await
        .unwrap();
    let after = SessionRepo::find_by_token(&pool, "tok-touch")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.last_ip, "198.51.100.2");
    assert_eq!(after.user_agent, "phone");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn record_generation_increments_under_lock(pool: PgPool) {
    let session = SessionRepo::create(&pool, &new_session("tok-count"))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let locked = SessionRepo::lock(&mut tx, session.id).await.unwrap();
    assert_eq!(locked.generation_count, 0);
    let count = SessionRepo::record_generation(&mut tx, session.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(count, 1);
    tx.commit().await.unwrap();

    let after = SessionRepo::find_by_token(&pool, "tok-count")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.generation_count, 1);
    assert!(after.last_generation_at.is_some());
}

// ---------------------------------------------------------------------------
// Catalog scoping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn catalog_listings_filter_inactive_and_scope(pool: PgPool) {
    CatalogRepo::create_style(&pool, &new_style("fade", true))
        .await
        .unwrap();
    CatalogRepo::create_style(&pool, &new_style("retired", false))
        .await
        .unwrap();
    CatalogRepo::create_beard_style(
        &pool,
        &CreateBeardStyle {
            name: Some("full".to_string()),
            image_path: "beards/full.jpg".to_string(),
            is_active: true,
            sort_order: 0,
        },
    )
    .await
    .unwrap();

    let hair_only = CatalogRepo::create_color(
        &pool,
        &CreateColorOption {
            name: "Platinum".to_string(),
            hex_code: "#e5e4e2".to_string(),
            scope: "hair".to_string(),
            is_active: true,
            sort_order: 0,
        },
    )
    .await
    .unwrap();
    let both = CatalogRepo::create_color(
        &pool,
        &CreateColorOption {
            name: "Black".to_string(),
            hex_code: "#111111".to_string(),
            scope: "both".to_string(),
            is_active: true,
            sort_order: 1,
        },
    )
    .await
    .unwrap();

    let styles = CatalogRepo::list_active_styles(&pool).await.unwrap();
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0].name.as_deref(), Some("fade"));

    let hair_colors = CatalogRepo::list_active_colors(&pool, ColorScope::Hair)
        .await
        .unwrap();
    assert_eq!(hair_colors.len(), 2);

    let beard_colors = CatalogRepo::list_active_colors(&pool, ColorScope::Beard)
        .await
        .unwrap();
    assert_eq!(beard_colors.len(), 1);
    assert_eq!(beard_colors[0].id, both.id);

    // A hair-scoped color is not available to the beard slot.
    assert!(
        CatalogRepo::find_active_color(&pool, hair_only.id, ColorScope::Beard)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        CatalogRepo::find_active_color(&pool, hair_only.id, ColorScope::Hair)
            .await
            .unwrap()
            .is_some()
    );
}

// ---------------------------------------------------------------------------
// Generation dedup key
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reusable_lookup_requires_success_and_result(pool: PgPool) {
    let session = SessionRepo::create(&pool, &new_session("tok-dedup"))
        .await
        .unwrap();
    let style = CatalogRepo::create_style(&pool, &new_style("fade", true))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let generation = GenerationRepo::create_pending(
        &mut tx,
        &new_generation(session.id, Some(style.id), "selfies/a.jpg"),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let source = StyleSource::Curated(style.id);

    // Pending rows never satisfy the cache key.
    let mut conn = pool.acquire().await.unwrap();
    let hit = GenerationRepo::find_reusable(
        &mut conn, session.id, &source, None, None, None, "selfies/a.jpg",
    )
    .await
    .unwrap();
    assert!(hit.is_none());

    GenerationRepo::mark_succeeded(&pool, generation.id, "results/1.png", "stub", 42)
        .await
        .unwrap();

    let hit = GenerationRepo::find_reusable(
        &mut conn, session.id, &source, None, None, None, "selfies/a.jpg",
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(hit.id, generation.id);
    assert_eq!(hit.status, "succeeded");

    // A different selfie is a different key.
    let miss = GenerationRepo::find_reusable(
        &mut conn, session.id, &source, None, None, None, "selfies/b.jpg",
    )
    .await
    .unwrap();
    assert!(miss.is_none());

    // So is a different beard choice.
    let miss = GenerationRepo::find_reusable(
        &mut conn, session.id, &source, Some(99), None, None, "selfies/a.jpg",
    )
    .await
    .unwrap();
    assert!(miss.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn custom_styles_dedup_by_fingerprint(pool: PgPool) {
    let session = SessionRepo::create(&pool, &new_session("tok-custom"))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let generation = GenerationRepo::create_pending(
        &mut tx,
        &CreateGeneration {
            custom_style_path: Some("custom/ref.jpg".to_string()),
            custom_style_fingerprint: "f".repeat(64),
            ..new_generation(session.id, None, "selfies/a.jpg")
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    GenerationRepo::mark_succeeded(&pool, generation.id, "results/2.png", "stub", 10)
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let hit = GenerationRepo::find_reusable(
        &mut conn,
        session.id,
        &StyleSource::Custom {
            fingerprint: "f".repeat(64),
        },
        None,
        None,
        None,
        "selfies/a.jpg",
    )
    .await
    .unwrap();
    assert!(hit.is_some());

    let miss = GenerationRepo::find_reusable(
        &mut conn,
        session.id,
        &StyleSource::Custom {
            fingerprint: "0".repeat(64),
        },
        None,
        None,
        None,
        "selfies/a.jpg",
    )
    .await
    .unwrap();
    assert!(miss.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_generations_are_never_reused(pool: PgPool) {
    let session = SessionRepo::create(&pool, &new_session("tok-fail"))
        .await
        .unwrap();
    let style = CatalogRepo::create_style(&pool, &new_style("fade", true))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let generation = GenerationRepo::create_pending(
        &mut tx,
        &new_generation(session.id, Some(style.id), "selfies/a.jpg"),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let long_error = "boom ".repeat(100);
    GenerationRepo::mark_failed(&pool, generation.id, &long_error, 7)
        .await
        .unwrap();

    let detail = GenerationRepo::detail(&pool, generation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.status, "failed");

    let stored = GenerationRepo::find_prior_success(
        &mut pool.acquire().await.unwrap(),
        session.id,
        style.id,
        None,
        None,
        None,
        "selfies/a.jpg",
    )
    .await
    .unwrap();
    assert!(stored.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn terminal_states_are_immutable(pool: PgPool) {
    let session = SessionRepo::create(&pool, &new_session("tok-term"))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let generation =
        GenerationRepo::create_pending(&mut tx, &new_generation(session.id, None, "s.jpg"))
            .await
            .unwrap();
    tx.commit().await.unwrap();

    GenerationRepo::mark_failed(&pool, generation.id, "credentials missing", 3)
        .await
        .unwrap();
    // A late success write must not resurrect the failed record.
    GenerationRepo::mark_succeeded(&pool, generation.id, "results/late.png", "stub", 99)
        .await
        .unwrap();

    let detail = GenerationRepo::detail(&pool, generation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.status, "failed");
    assert!(detail.result_path.is_none());
}

// ---------------------------------------------------------------------------
// Rate-limit events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rate_limit_counts_respect_action_ip_and_window(pool: PgPool) {
    RateLimitRepo::record(&pool, actions::START, "203.0.113.9", None)
        .await
        .unwrap();
    RateLimitRepo::record(&pool, actions::GENERATE, "203.0.113.9", None)
        .await
        .unwrap();
    RateLimitRepo::record(&pool, actions::GENERATE, "198.51.100.7", None)
        .await
        .unwrap();
    // Empty IP events are dropped.
    RateLimitRepo::record(&pool, actions::GENERATE, "", None)
        .await
        .unwrap();

    let hour_ago = Utc::now() - Duration::hours(1);
    assert_eq!(
        RateLimitRepo::count_recent(&pool, actions::GENERATE, "203.0.113.9", hour_ago)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        RateLimitRepo::count_recent(&pool, actions::START, "203.0.113.9", hour_ago)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        RateLimitRepo::count_recent(&pool, actions::GENERATE, "192.0.2.1", hour_ago)
            .await
            .unwrap(),
        0
    );
    // A window starting in the future counts nothing.
    assert_eq!(
        RateLimitRepo::count_recent(
            &pool,
            actions::GENERATE,
            "203.0.113.9",
            Utc::now() + Duration::minutes(1)
        )
        .await
        .unwrap(),
        0
    );
}

// ---------------------------------------------------------------------------
// Retention sweep queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sweep_queries_find_only_stale_rows(pool: PgPool) {
    // One session expired two days ago, one still alive.
    let stale = SessionRepo::create(
        &pool,
        &CreateSession {
            expires_at: Utc::now() - Duration::days(2),
            ..new_session("tok-old")
        },
    )
    .await
    .unwrap();
    let fresh = SessionRepo::create(&pool, &new_session("tok-new"))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    GenerationRepo::create_pending(&mut tx, &new_generation(stale.id, None, "old.jpg"))
        .await
        .unwrap();
    GenerationRepo::create_pending(&mut tx, &new_generation(fresh.id, None, "new.jpg"))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    RateLimitRepo::record(&pool, actions::START, "203.0.113.9", Some(stale.id))
        .await
        .unwrap();

    let cutoff = Utc::now() - Duration::hours(24);
    let expired: Vec<i64> = SessionRepo::expired_before(&pool, cutoff)
        .await
        .unwrap()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(expired, vec![stale.id]);

    let stale_generations = GenerationRepo::stale_before(&pool, cutoff, &expired)
        .await
        .unwrap();
    assert_eq!(stale_generations.len(), 1);
    assert_eq!(stale_generations[0].selfie_path, "old.jpg");

    let generation_ids: Vec<i64> = stale_generations.iter().map(|g| g.id).collect();
    assert_eq!(
        GenerationRepo::delete_by_ids(&pool, &generation_ids)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        RateLimitRepo::delete_stale(&pool, cutoff, &expired)
            .await
            .unwrap(),
        1
    );
    assert_eq!(SessionRepo::delete_by_ids(&pool, &expired).await.unwrap(), 1);

    // The fresh session and its generation survive.
    assert!(SessionRepo::find_by_token(&pool, "tok-new")
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        GenerationRepo::count_for_session(&pool, fresh.id)
            .await
            .unwrap(),
        1
    );
}
