//! Image-generation provider adapters.
//!
//! A uniform [`ImageProvider`] interface over heterogeneous external
//! image-editing services. Each adapter owns its request/response
//! envelope, authentication scheme, and input packaging (separate inline
//! panels vs one pre-composited image); all of them normalize every
//! failure into [`ProviderError`]. The stub adapter echoes the selfie
//! back and exists for tests and provider-less deployments.

pub mod composite;
pub mod cost;
pub mod error;
pub mod grok;
pub mod http;
pub mod nanobanana;
pub mod stub;

use std::time::Duration;

pub use error::ProviderError;

/// Input to a generation call, assembled by the orchestrator.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Absolute path to the visitor's selfie.
    pub selfie_path: String,
    /// Absolute path to the hairstyle reference image (curated catalog
    /// image or the visitor's custom upload).
    pub reference_path: String,
    /// Absolute path to the beard reference image, when a beard style
    /// was chosen.
    pub beard_reference_path: Option<String>,
    /// Chosen hair color name, or empty to keep the natural tone.
    pub hair_color_name: String,
    /// Chosen beard color name, or empty.
    pub beard_color_name: String,
    /// Catalog description text for the chosen style, if any.
    pub style_description: String,
    /// Whether the beard should be edited at all.
    pub apply_beard_edit: bool,
}

/// A successfully generated image.
#[derive(Debug, Clone)]
pub struct ImageOutput {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    pub provider: &'static str,
}

/// Provider selection plus per-provider settings, assembled from the
/// environment by the api crate.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// One of "stub", "nanobanana", "grok".
    pub provider: String,
    /// Timeout applied to every outbound provider request.
    pub timeout: Duration,
    pub nanobanana: nanobanana::NanobananaConfig,
    pub grok: grok::GrokConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "stub".to_string(),
            timeout: Duration::from_secs(120),
            nanobanana: nanobanana::NanobananaConfig::default(),
            grok: grok::GrokConfig::default(),
        }
    }
}

/// The capability every adapter implements.
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync + std::fmt::Debug {
    /// Stable provider name recorded on generation rows.
    fn name(&self) -> &'static str;

    /// Transform the selfie according to the request, returning image
    /// bytes or a normalized error. Adapters never panic across this
    /// boundary.
    async fn generate(&self, request: &GenerateRequest) -> Result<ImageOutput, ProviderError>;
}

/// Build the configured adapter. Unknown names are a typed error, not a
/// fallback -- a misconfigured deployment should fail loudly on the
/// first generation attempt.
pub fn build_provider(config: &ProviderConfig) -> Result<Box<dyn ImageProvider>, ProviderError> {
    let name = config.provider.trim().to_ascii_lowercase();
    match name.as_str() {
        "" | "stub" => Ok(Box::new(stub::StubProvider)),
        "nanobanana" => Ok(Box::new(nanobanana::NanobananaProvider::new(
            config.nanobanana.clone(),
            config.timeout,
        ))),
        "grok" => Ok(Box::new(grok::GrokImagesProvider::new(
            config.grok.clone(),
            config.timeout,
        ))),
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}
