//! Shared helpers for API integration tests: app construction with
//! test-tuned config, catalog seeding, and raw HTTP/multipart plumbing
//! driven through the router with `tower::ServiceExt::oneshot`.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use barberlab_api::config::{AppConfig, PlaygroundConfig, ServerConfig};
use barberlab_api::router::build_app_router;
use barberlab_api::state::AppState;
use barberlab_db::models::catalog::{CreateBeardStyle, CreateColorOption, CreateHairStyle};
use barberlab_db::repositories::CatalogRepo;

/// Client IP used in every test request.
pub const TEST_IP: &str = "203.0.113.77";

pub struct TestApp {
    pub router: axum::Router,
    pub pool: PgPool,
    // Held so the media root outlives the test.
    _media_dir: tempfile::TempDir,
}

fn test_config(media_root: &Path) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
        },
        playground: PlaygroundConfig {
            cookie_name: "ai_playground_session".to_string(),
            cookie_secure: false,
            signing_key: "test-signing-key".to_string(),
            session_duration_minutes: 30,
            max_image_size_bytes: 6 * 1024 * 1024,
            start_max_per_ip_per_hour: 120,
            generate_max_per_ip_per_hour: 60,
            session_generation_limit: 5,
            // Most tests submit back to back; the cooldown gets its own
            // dedicated test.
            min_generate_interval_seconds: 0,
            one_style_per_session: true,
            retention_hours: 24,
            media_root: media_root.to_path_buf(),
            debug: false,
            provider: barberlab_providers::ProviderConfig::default(),
        },
    }
}

/// Build an app over the given pool, letting the test adjust the
/// playground config first.
pub fn spawn_app(pool: PgPool, tweak: impl FnOnce(&mut PlaygroundConfig)) -> TestApp {
    let media_dir = tempfile::tempdir().expect("media tempdir");
    let mut config = test_config(media_dir.path());
    tweak(&mut config.playground);

    let state = AppState::new(pool.clone(), config.clone());
    let router = build_app_router(state, &config);
    TestApp {
        router,
        pool,
        _media_dir: media_dir,
    }
}

impl TestApp {
    pub fn media_root(&self) -> &Path {
        self._media_dir.path()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("GET")
            .uri(uri)
            .header("x-forwarded-for", TEST_IP);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, Part)],
    ) -> Response<Body> {
        let (content_type, body) = multipart_body(fields);
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-forwarded-for", TEST_IP)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    /// GET /start and return the session cookie pair (`name=value`).
    pub async fn start_session(&self) -> String {
        let response = self.get("/start", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("start must set the session cookie")
            .to_str()
            .unwrap();
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string()
    }

    /// Upload a selfie for the session behind `cookie`.
    pub async fn upload_selfie(&self, cookie: &str) {
        let response = self
            .post_multipart(
                "/api/selfie",
                Some(cookie),
                &[(
                    "image",
                    Part::file("selfie.png", "image/png", b"not a real png but nobody decodes it"),
                )],
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

/// One multipart field.
pub enum Part {
    Text(String),
    File {
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl Part {
    pub fn text(value: impl Into<String>) -> Self {
        Part::Text(value.into())
    }

    pub fn file(filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        Part::File {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.to_vec(),
        }
    }
}

const BOUNDARY: &str = "barberlab-test-boundary";

/// Assemble a multipart/form-data body by hand.
pub fn multipart_body(fields: &[(&str, Part)]) -> (String, Vec<u8>) {
    let mut body: Vec<u8> = Vec::new();
    for (name, part) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (
        format!("multipart/form-data; boundary={BOUNDARY}"),
        body,
    )
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body must be JSON")
}

/// Ids of the seeded catalog rows.
pub struct SeededCatalog {
    pub active_style_id: i64,
    pub inactive_style_id: i64,
    pub second_style_id: i64,
    pub beard_style_id: i64,
    pub hair_color_id: i64,
    pub beard_color_id: i64,
}

/// Seed one active + one inactive hairstyle, a second active style for
/// quota/cooldown tests, a beard style, and scoped colors.
pub async fn seed_catalog(pool: &PgPool) -> SeededCatalog {
    let active = CatalogRepo::create_style(
        pool,
        &CreateHairStyle {
            name: Some("Low Fade".to_string()),
            description: "Tight low fade, textured top".to_string(),
            image_path: "styles/low-fade.jpg".to_string(),
            is_active: true,
            sort_order: 0,
        },
    )
    .await
    .unwrap();
    let inactive = CatalogRepo::create_style(
        pool,
        &CreateHairStyle {
            name: Some("Retired Mullet".to_string()),
            description: String::new(),
            image_path: "styles/mullet.jpg".to_string(),
            is_active: false,
            sort_order: 1,
        },
    )
    .await
    .unwrap();
    let second = CatalogRepo::create_style(
        pool,
        &CreateHairStyle {
            name: Some("Buzz Cut".to_string()),
            description: String::new(),
            image_path: "styles/buzz.jpg".to_string(),
            is_active: true,
            sort_order: 2,
        },
    )
    .await
    .unwrap();
    let beard = CatalogRepo::create_beard_style(
        pool,
        &CreateBeardStyle {
            name: Some("Full Beard".to_string()),
            image_path: "beards/full.jpg".to_string(),
            is_active: true,
            sort_order: 0,
        },
    )
    .await
    .unwrap();
    let hair_color = CatalogRepo::create_color(
        pool,
        &CreateColorOption {
            name: "Ash Gray".to_string(),
            hex_code: "#b2beb5".to_string(),
            scope: "hair".to_string(),
            is_active: true,
            sort_order: 0,
        },
    )
    .await
    .unwrap();
    let beard_color = CatalogRepo::create_color(
        pool,
        &CreateColorOption {
            name: "Jet Black".to_string(),
            hex_code: "#111111".to_string(),
            scope: "both".to_string(),
            is_active: true,
            sort_order: 1,
        },
    )
    .await
    .unwrap();

    SeededCatalog {
        active_style_id: active.id,
        inactive_style_id: inactive.id,
        second_style_id: second.id,
        beard_style_id: beard.id,
        hair_color_id: hair_color.id,
        beard_color_id: beard_color.id,
    }
}

/// The standard all-"none" curated-style generate form.
pub fn curated_form(style_id: i64) -> Vec<(&'static str, Part)> {
    vec![
        ("style_id", Part::text(style_id.to_string())),
        ("hair_color_option_id", Part::text("none")),
        ("beard_style_id", Part::text("none")),
        ("beard_color_option_id", Part::text("none")),
    ]
}
