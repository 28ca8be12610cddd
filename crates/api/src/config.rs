//! Server and playground configuration loaded from environment
//! variables. All fields have defaults suitable for local development;
//! override via the environment in production.

use std::path::PathBuf;
use std::time::Duration;

use barberlab_providers::grok::GrokConfig;
use barberlab_providers::nanobanana::NanobananaConfig;
use barberlab_providers::ProviderConfig;

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u8(name: &str) -> Option<u8> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

/// HTTP server settings.
///
/// | Env Var                | Default                 |
/// |------------------------|-------------------------|
/// | `HOST`                 | `0.0.0.0`               |
/// | `PORT`                 | `3000`                  |
/// | `CORS_ORIGINS`         | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS` | `300`                   |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Generous because a provider call can legitimately take minutes.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = env_string("HOST", "0.0.0.0");
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");
        let cors_origins: Vec<String> = env_string("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout_secs = env_i64("REQUEST_TIMEOUT_SECS", 300).max(1) as u64;

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
        }
    }
}

/// Playground behavior settings.
///
/// | Env Var                                      | Default                 |
/// |----------------------------------------------|-------------------------|
/// | `PLAYGROUND_SESSION_COOKIE_NAME`             | `ai_playground_session` |
/// | `PLAYGROUND_SESSION_COOKIE_SECURE`           | `!PLAYGROUND_DEBUG`     |
/// | `PLAYGROUND_SIGNING_KEY`                     | (dev-only value)        |
/// | `PLAYGROUND_SESSION_DURATION_MINUTES`        | `30`                    |
/// | `PLAYGROUND_MAX_IMAGE_SIZE_BYTES`            | `6291456`               |
/// | `PLAYGROUND_START_MAX_PER_IP_PER_HOUR`       | `120`                   |
/// | `PLAYGROUND_GENERATE_MAX_PER_IP_PER_HOUR`    | `60`                    |
/// | `PLAYGROUND_SESSION_GENERATION_LIMIT`        | `5`                     |
/// | `PLAYGROUND_MIN_GENERATE_INTERVAL_SECONDS`   | `10`                    |
/// | `PLAYGROUND_ONE_STYLE_PER_SESSION`           | `1`                     |
/// | `PLAYGROUND_DATA_RETENTION_HOURS`            | `24`                    |
/// | `PLAYGROUND_MEDIA_ROOT`                      | `./media`               |
/// | `PLAYGROUND_DEBUG`                           | `0`                     |
/// | `PLAYGROUND_PROVIDER`                        | `stub`                  |
/// | `PLAYGROUND_PROVIDER_TIMEOUT_SECONDS`        | `120`                   |
#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub signing_key: String,
    pub session_duration_minutes: i64,
    pub max_image_size_bytes: usize,
    pub start_max_per_ip_per_hour: i64,
    pub generate_max_per_ip_per_hour: i64,
    pub session_generation_limit: i32,
    pub min_generate_interval_seconds: i64,
    pub one_style_per_session: bool,
    pub retention_hours: i64,
    pub media_root: PathBuf,
    pub debug: bool,
    pub provider: ProviderConfig,
}

impl PlaygroundConfig {
    pub fn from_env() -> Self {
        let debug = env_bool("PLAYGROUND_DEBUG", false);
        Self {
            cookie_name: env_string("PLAYGROUND_SESSION_COOKIE_NAME", "ai_playground_session"),
            cookie_secure: env_bool("PLAYGROUND_SESSION_COOKIE_SECURE", !debug),
            signing_key: env_string("PLAYGROUND_SIGNING_KEY", "dev-only-insecure-signing-key"),
            session_duration_minutes: env_i64("PLAYGROUND_SESSION_DURATION_MINUTES", 30).max(1),
            max_image_size_bytes: env_i64(
                "PLAYGROUND_MAX_IMAGE_SIZE_BYTES",
                6 * 1024 * 1024,
            )
            .max(1) as usize,
            start_max_per_ip_per_hour: env_i64("PLAYGROUND_START_MAX_PER_IP_PER_HOUR", 120),
            generate_max_per_ip_per_hour: env_i64("PLAYGROUND_GENERATE_MAX_PER_IP_PER_HOUR", 60),
            session_generation_limit: env_i64("PLAYGROUND_SESSION_GENERATION_LIMIT", 5) as i32,
            min_generate_interval_seconds: env_i64("PLAYGROUND_MIN_GENERATE_INTERVAL_SECONDS", 10),
            one_style_per_session: env_bool("PLAYGROUND_ONE_STYLE_PER_SESSION", true),
            retention_hours: env_i64("PLAYGROUND_DATA_RETENTION_HOURS", 24).max(1),
            media_root: PathBuf::from(env_string("PLAYGROUND_MEDIA_ROOT", "./media")),
            debug,
            provider: provider_config_from_env(),
        }
    }

    /// Cookie and signed-token max age, in seconds.
    pub fn session_max_age_secs(&self) -> i64 {
        self.session_duration_minutes * 60
    }
}

fn provider_config_from_env() -> ProviderConfig {
    ProviderConfig {
        provider: env_string("PLAYGROUND_PROVIDER", "stub")
            .trim()
            .to_ascii_lowercase(),
        timeout: Duration::from_secs(
            env_i64("PLAYGROUND_PROVIDER_TIMEOUT_SECONDS", 120).max(1) as u64,
        ),
        nanobanana: NanobananaConfig {
            api_key: env_string("PLAYGROUND_NANOBANANA_API_KEY", ""),
            model: env_string("PLAYGROUND_NANOBANANA_MODEL", "gemini-2.5-flash-image"),
            endpoint_override: env_string("PLAYGROUND_NANOBANANA_ENDPOINT", ""),
            image_size: env_string("PLAYGROUND_NANOBANANA_IMAGE_SIZE", ""),
            prompt_set: env_u8("PLAYGROUND_NANOBANANA_PROMPT_SET").unwrap_or(1),
            flash_prompt_set: env_u8("PLAYGROUND_NANOBANANA_FLASH_PROMPT_SET"),
            pro_prompt_set: env_u8("PLAYGROUND_NANOBANANA_PRO_PROMPT_SET"),
            input_cost_per_1m_tokens: env_f64("PLAYGROUND_NANOBANANA_INPUT_COST_PER_1M_TOKENS", 0.0),
            output_cost_per_1m_tokens: env_f64(
                "PLAYGROUND_NANOBANANA_OUTPUT_COST_PER_1M_TOKENS",
                0.0,
            ),
        },
        grok: GrokConfig {
            api_key: env_string("PLAYGROUND_GROK_API_KEY", ""),
            model: env_string("PLAYGROUND_GROK_MODEL", "grok-2-image"),
            endpoint: env_string(
                "PLAYGROUND_GROK_IMAGES_ENDPOINT",
                "https://api.x.ai/v1/images/edits",
            ),
            image_format: env_string("PLAYGROUND_GROK_IMAGE_FORMAT", "base64"),
        },
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub playground: PlaygroundConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            playground: PlaygroundConfig::from_env(),
        }
    }
}
