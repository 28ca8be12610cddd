//! Normalized provider error type.
//!
//! Every failure mode inside an adapter -- missing credentials, network
//! trouble, a non-2xx response, an unparseable payload, a response with
//! no image in it -- surfaces as a [`ProviderError`]. The orchestrator
//! needs no provider-specific handling and nothing else crosses the
//! adapter boundary.

/// Maximum provider response body length kept in error messages.
const MAX_ERROR_BODY_LEN: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The configured provider name matches no known adapter.
    #[error("Unsupported provider '{0}'. Set PLAYGROUND_PROVIDER to one of: nanobanana, grok, stub.")]
    UnknownProvider(String),

    /// Required credentials are absent; the adapter fails fast without
    /// issuing any request.
    #[error("{0} API key is missing.")]
    MissingCredentials(&'static str),

    /// The provider answered with a non-2xx status.
    #[error("Provider HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never completed (DNS, TLS, connection reset, ...).
    #[error("Provider connection failed: {0}")]
    Connection(String),

    /// The configured timeout elapsed.
    #[error("Provider request timed out.")]
    Timeout,

    /// The response arrived but could not be understood.
    #[error("Provider returned an invalid payload: {0}")]
    InvalidPayload(String),

    /// A well-formed response that contains no image output.
    #[error("{0}")]
    NoImage(&'static str),

    /// A local file the adapter needed could not be read or processed.
    #[error("Image file error: {0}")]
    Io(String),
}

impl ProviderError {
    /// Build an HTTP error with the body truncated to a loggable size.
    pub fn http(status: u16, body: &str) -> Self {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        ProviderError::Http {
            status,
            body: truncated,
        }
    }

    /// Transient upstream failures worth one more attempt: throttling
    /// and temporary unavailability signatures only.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http { status, body } => {
                matches!(status, 429 | 503)
                    || body.contains("RESOURCE_EXHAUSTED")
                    || body.contains("UNAVAILABLE")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() || err.is_request() {
            ProviderError::Connection(err.to_string())
        } else if err.is_decode() {
            ProviderError::InvalidPayload(err.to_string())
        } else {
            ProviderError::Connection(err.to_string())
        }
    }
}
