//! Grok images/edits adapter.
//!
//! Grok takes a single input image, so the selfie and reference(s) are
//! composited side by side first and sent as a data URL with a prompt
//! describing the panel layout. Authentication is a Bearer token. The
//! response carries the result as base64 (`b64_json`), a downloadable
//! URL, or a bare `image` field depending on the requested format.
//! Single attempt; failures go back to the visitor.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use barberlab_core::prompts::{build_hair_prompt, PromptSpec, PROMPT_SET_DEFAULT, PROMPT_STYLE_PRO};

use crate::composite::build_composite;
use crate::error::ProviderError;
use crate::http::{decode_base64_image, download_binary, post_json};
use crate::{GenerateRequest, ImageOutput, ImageProvider};

pub const PROVIDER_NAME: &str = "grok";

/// Settings for the Grok adapter.
#[derive(Debug, Clone)]
pub struct GrokConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    /// Requested response format; "base64" asks for inline payloads.
    pub image_format: String,
}

impl Default for GrokConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "grok-2-image".to_string(),
            endpoint: "https://api.x.ai/v1/images/edits".to_string(),
            image_format: "base64".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct GrokImagesProvider {
    config: GrokConfig,
    client: reqwest::Client,
}

impl GrokImagesProvider {
    pub fn new(config: GrokConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }
}

/// Pull the result image out of an images/edits response.
async fn extract_image(
    client: &reqwest::Client,
    payload: &Value,
) -> Result<(Vec<u8>, String), ProviderError> {
    if let Some(first) = payload
        .get("data")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
    {
        if let Some(b64) = first.get("b64_json").and_then(Value::as_str) {
            return Ok((decode_base64_image(b64)?, "image/png".to_string()));
        }
        if let Some(url) = first.get("url").and_then(Value::as_str) {
            return download_binary(client, url).await;
        }
    }

    if let Some(b64) = payload.get("b64_json").and_then(Value::as_str) {
        return Ok((decode_base64_image(b64)?, "image/png".to_string()));
    }
    if let Some(url) = payload.get("url").and_then(Value::as_str) {
        return download_binary(client, url).await;
    }
    if let Some(b64) = payload.get("image").and_then(Value::as_str) {
        return Ok((decode_base64_image(b64)?, "image/png".to_string()));
    }

    Err(ProviderError::NoImage(
        "Grok provider returned no image output.",
    ))
}

#[async_trait::async_trait]
impl ImageProvider for GrokImagesProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<ImageOutput, ProviderError> {
        if self.config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredentials("Grok"));
        }

        let mut reference_paths: Vec<&str> = vec![request.reference_path.as_str()];
        if let Some(beard_path) = &request.beard_reference_path {
            reference_paths.push(beard_path.as_str());
        }
        let composite_bytes = build_composite(&request.selfie_path, &reference_paths)?;
        let data_url = format!(
            "data:image/jpeg;base64,{}",
            STANDARD.encode(&composite_bytes)
        );

        let prompt = build_hair_prompt(
            PROMPT_STYLE_PRO,
            &PromptSpec {
                composite_input: true,
                include_beard_reference: request.beard_reference_path.is_some(),
                style_description: request.style_description.clone(),
                hair_color_name: request.hair_color_name.clone(),
                beard_color_name: request.beard_color_name.clone(),
                apply_beard_edit: request.apply_beard_edit,
                prompt_set: PROMPT_SET_DEFAULT,
            },
        );

        let payload = json!({
            "model": self.config.model,
            "prompt": prompt,
            "image_url": data_url,
            "image_format": self.config.image_format,
        });

        let auth_value = format!("Bearer {}", self.config.api_key.trim());
        let response = post_json(
            &self.client,
            self.config.endpoint.trim(),
            &[("Authorization", auth_value.as_str())],
            &payload,
        )
        .await?;

        let (image_bytes, mime_type) = extract_image(&self.client, &response).await?;
        Ok(ImageOutput {
            image_bytes,
            mime_type,
            provider: PROVIDER_NAME,
        })
    }
}
