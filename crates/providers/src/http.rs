//! Thin reqwest wrapper shared by the remote adapters.
//!
//! Maps every transport-level outcome onto [`ProviderError`] in one
//! place: non-2xx statuses keep a truncated body for diagnostics, JSON
//! decode failures become `InvalidPayload`, timeouts and connection
//! failures keep their own variants.

use crate::error::ProviderError;

/// POST a JSON payload and parse the JSON response.
pub async fn post_json(
    client: &reqwest::Client,
    url: &str,
    headers: &[(&str, &str)],
    payload: &serde_json::Value,
) -> Result<serde_json::Value, ProviderError> {
    let mut request = client.post(url).json(payload);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::http(status.as_u16(), &body));
    }
    if body.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|_| ProviderError::InvalidPayload("Provider returned invalid JSON.".into()))
}

/// Download binary content, returning the bytes and the MIME type from
/// the `Content-Type` header (defaulting to PNG).
pub async fn download_binary(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<u8>, String), ProviderError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::http(status.as_u16(), &body));
    }

    let mime_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "image/png".to_string());

    let bytes = response.bytes().await?;
    Ok((bytes.to_vec(), mime_type))
}

/// Decode a base64 image payload from a provider response.
pub fn decode_base64_image(raw: &str) -> Result<Vec<u8>, ProviderError> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    STANDARD.decode(raw).map_err(|_| {
        ProviderError::InvalidPayload("Provider returned invalid base64 image payload.".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_decoding_round_trips() {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine as _;
        let encoded = STANDARD.encode(b"fake image bytes");
        assert_eq!(decode_base64_image(&encoded).unwrap(), b"fake image bytes");
    }

    #[test]
    fn invalid_base64_is_a_payload_error() {
        match decode_base64_image("!!! not base64 !!!") {
            Err(ProviderError::InvalidPayload(_)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
