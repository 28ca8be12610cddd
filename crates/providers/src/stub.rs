//! Echo adapter: returns the selfie unchanged.
//!
//! Used by tests and by deployments with no generation provider
//! configured. Succeeds whenever the selfie file is readable.

use barberlab_core::media::guess_mime_type;

use crate::error::ProviderError;
use crate::{GenerateRequest, ImageOutput, ImageProvider};

#[derive(Debug)]
pub struct StubProvider;

pub const PROVIDER_NAME: &str = "stub";

#[async_trait::async_trait]
impl ImageProvider for StubProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<ImageOutput, ProviderError> {
        let image_bytes = tokio::fs::read(&request.selfie_path)
            .await
            .map_err(|e| ProviderError::Io(format!("{}: {e}", request.selfie_path)))?;
        Ok(ImageOutput {
            mime_type: guess_mime_type(&request.selfie_path).to_string(),
            image_bytes,
            provider: PROVIDER_NAME,
        })
    }
}
