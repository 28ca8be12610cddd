//! Nanobanana adapter (Gemini-style `generateContent` image editing).
//!
//! Sends the selfie and reference image(s) as separate labelled inline
//! parts followed by the edit instruction, authenticated with an
//! `x-goog-api-key` header. Reported token usage is turned into a cost
//! estimate and logged; it never affects control flow.
//!
//! This is the only adapter that retries: a small fixed attempt budget,
//! short linear backoff, and only for transient throttle/unavailable
//! signatures. Everything else fails on the first attempt.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use barberlab_core::media::guess_mime_type;
use barberlab_core::prompts::{
    build_hair_prompt, resolve_prompt_set, PromptSpec, PROMPT_SET_DEFAULT, PROMPT_STYLE_FLASH,
    PROMPT_STYLE_PRO,
};

use crate::cost::{estimate_cost_usd, extract_usage, is_pro_image_model, pricing_for_model};
use crate::error::ProviderError;
use crate::http::{decode_base64_image, post_json};
use crate::{GenerateRequest, ImageOutput, ImageProvider};

pub const PROVIDER_NAME: &str = "nanobanana";

/// Valid image-size overrides for pro-tier models.
const IMAGE_SIZE_OPTIONS: [&str; 3] = ["1K", "2K", "4K"];

/// Total attempts per request (one initial + bounded retries).
const MAX_ATTEMPTS: u32 = 3;

/// Linear backoff step between attempts.
const RETRY_BACKOFF: Duration = Duration::from_millis(400);

/// Settings for the nanobanana adapter.
#[derive(Debug, Clone)]
pub struct NanobananaConfig {
    pub api_key: String,
    pub model: String,
    /// Full endpoint URL; empty means the default generateContent URL
    /// derived from the model id.
    pub endpoint_override: String,
    /// "1K", "2K", or "4K"; only honored for pro-tier models.
    pub image_size: String,
    /// Instruction set used when no per-tier override applies.
    pub prompt_set: u8,
    pub flash_prompt_set: Option<u8>,
    pub pro_prompt_set: Option<u8>,
    /// Pricing fallbacks for models missing from the built-in table.
    pub input_cost_per_1m_tokens: f64,
    pub output_cost_per_1m_tokens: f64,
}

impl Default for NanobananaConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash-image".to_string(),
            endpoint_override: String::new(),
            image_size: String::new(),
            prompt_set: PROMPT_SET_DEFAULT,
            flash_prompt_set: None,
            pro_prompt_set: None,
            input_cost_per_1m_tokens: 0.0,
            output_cost_per_1m_tokens: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct NanobananaProvider {
    config: NanobananaConfig,
    client: reqwest::Client,
}

impl NanobananaProvider {
    pub fn new(config: NanobananaConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        if !self.config.endpoint_override.trim().is_empty() {
            return self.config.endpoint_override.trim().to_string();
        }
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.config.model.trim()
        )
    }

    fn resolved_prompt_style(&self) -> &'static str {
        if is_pro_image_model(&self.config.model) {
            PROMPT_STYLE_PRO
        } else {
            PROMPT_STYLE_FLASH
        }
    }

    fn resolved_prompt_set(&self) -> u8 {
        let tier_override = if is_pro_image_model(&self.config.model) {
            self.config.pro_prompt_set
        } else {
            self.config.flash_prompt_set
        };
        resolve_prompt_set(tier_override.unwrap_or(self.config.prompt_set))
    }

    fn resolved_image_size(&self) -> Option<&str> {
        if !is_pro_image_model(&self.config.model) {
            return None;
        }
        let configured = self.config.image_size.trim().to_ascii_uppercase();
        if IMAGE_SIZE_OPTIONS.contains(&configured.as_str()) {
            return IMAGE_SIZE_OPTIONS
                .iter()
                .find(|s| **s == configured)
                .copied();
        }
        Some("1K")
    }

    async fn inline_part(path: &str) -> Result<Value, ProviderError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ProviderError::Io(format!("{path}: {e}")))?;
        Ok(json!({
            "inlineData": {
                "mimeType": guess_mime_type(path),
                "data": STANDARD.encode(bytes),
            }
        }))
    }

    async fn build_payload(&self, request: &GenerateRequest) -> Result<Value, ProviderError> {
        let mut parts = vec![
            json!({"text": "Image 1 (identity anchor selfie):"}),
            Self::inline_part(&request.selfie_path).await?,
            json!({"text": "Image 2 (target hairstyle reference):"}),
            Self::inline_part(&request.reference_path).await?,
        ];
        if let Some(beard_path) = &request.beard_reference_path {
            parts.push(json!({"text": "Image 3 (target beard reference):"}));
            parts.push(Self::inline_part(beard_path).await?);
        }
        parts.push(json!({
            "text": build_hair_prompt(
                self.resolved_prompt_style(),
                &PromptSpec {
                    composite_input: false,
                    include_beard_reference: request.beard_reference_path.is_some(),
                    style_description: request.style_description.clone(),
                    hair_color_name: request.hair_color_name.clone(),
                    beard_color_name: request.beard_color_name.clone(),
                    apply_beard_edit: request.apply_beard_edit,
                    prompt_set: self.resolved_prompt_set(),
                },
            )
        }));

        let mut generation_config = json!({"responseModalities": ["IMAGE"]});
        if let Some(size) = self.resolved_image_size() {
            generation_config["imageConfig"] = json!({"imageSize": size});
        }

        Ok(json!({
            "contents": [{"parts": parts}],
            "generationConfig": generation_config,
        }))
    }

    fn log_usage(&self, payload: &Value) {
        let usage = extract_usage(payload);
        let (input_rate, output_rate) = match pricing_for_model(&self.config.model) {
            Some(pricing) => (
                pricing.input_cost_per_1m_tokens,
                pricing.output_cost_per_1m_tokens,
            ),
            None => (
                self.config.input_cost_per_1m_tokens,
                self.config.output_cost_per_1m_tokens,
            ),
        };
        let estimated_cost_usd = estimate_cost_usd(usage, input_rate, output_rate);
        tracing::info!(
            model = %self.config.model,
            prompt_style = self.resolved_prompt_style(),
            prompt_set = self.resolved_prompt_set(),
            prompt_tokens = ?usage.prompt_tokens,
            completion_tokens = ?usage.completion_tokens,
            total_tokens = ?usage.total_tokens,
            estimated_cost_usd = ?estimated_cost_usd,
            "nanobanana usage"
        );
    }
}

/// Pull the first inline image out of a generateContent response.
fn extract_image(payload: &Value) -> Result<(Vec<u8>, String), ProviderError> {
    let candidates = payload
        .get("candidates")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for candidate in &candidates {
        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for part in &parts {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"));
            let Some(inline) = inline else { continue };
            let Some(data) = inline.get("data").and_then(Value::as_str) else {
                continue;
            };
            let mime = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .unwrap_or("image/png");
            return Ok((decode_base64_image(data)?, mime.to_string()));
        }
    }
    Err(ProviderError::NoImage(
        "Nanobanana provider returned no image output.",
    ))
}

#[async_trait::async_trait]
impl ImageProvider for NanobananaProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<ImageOutput, ProviderError> {
        if self.config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredentials("Nanobanana"));
        }

        let payload = self.build_payload(request).await?;
        let endpoint = self.endpoint();
        let api_key = self.config.api_key.trim().to_string();

        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            match post_json(
                &self.client,
                &endpoint,
                &[("x-goog-api-key", api_key.as_str())],
                &payload,
            )
            .await
            {
                Ok(response) => break response,
                Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(attempt, error = %err, "nanobanana transient failure, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(err) => return Err(err),
            }
        };

        self.log_usage(&response);
        let (image_bytes, mime_type) = extract_image(&response)?;
        Ok(ImageOutput {
            image_bytes,
            mime_type,
            provider: PROVIDER_NAME,
        })
    }
}
