use crate::domain::narration::AudioFormat;
use async_trait::async_trait;

/// Audio returned by one provider call, as delivered (container or raw PCM).
#[derive(Debug, Clone)]
pub struct ProviderAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

/// How a single provider call failed. The synthesizer decides from this
/// whether to back off before trying the next credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("rate limited (status 429)")]
    RateLimited,
    #[error("provider unavailable (status {0})")]
    Unavailable(u16),
    #[error("credential rejected (status {0})")]
    InvalidCredential(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => ProviderError::RateLimited,
            400 | 401 | 403 => ProviderError::InvalidCredential(status),
            _ => ProviderError::Unavailable(status),
        }
    }

    /// Throttling and outages get a pause before the next key; rejected
    /// credentials are skipped immediately.
    pub fn needs_backoff(&self) -> bool {
        !matches!(self, ProviderError::InvalidCredential(_))
    }
}

/// Repository for speech synthesis calls.
/// Abstracts the underlying provider so the synthesizer can rotate credentials
/// and retry without knowing the wire format.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one chunk of text with the given API key.
    ///
    /// # Errors
    /// Returns a classified `ProviderError`; the caller owns retry policy.
    async fn synthesize(&self, text: &str, api_key: &str) -> Result<ProviderAudio, ProviderError>;
}
