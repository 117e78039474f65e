use super::credentials::CredentialPool;
use super::error::NarrationError;
use super::model::{EncodedAudioSegment, TextChunk};
use crate::infrastructure::repositories::TtsRepository;
use std::sync::Arc;
use std::time::Duration;

/// Full passes over the credential pool before a chunk is abandoned.
const MAX_PASSES: usize = 2;

/// Turns one chunk into one audio segment, rotating through the credential
/// pool on throttling, outages and rejected keys.
pub struct SpeechSynthesizer {
    tts_repo: Arc<dyn TtsRepository>,
    credentials: Arc<CredentialPool>,
    backoff: Duration,
}

impl SpeechSynthesizer {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        credentials: Arc<CredentialPool>,
        backoff: Duration,
    ) -> Self {
        Self {
            tts_repo,
            credentials,
            backoff,
        }
    }

    /// Fails with `SynthesisExhausted` only after every credential has been
    /// tried `MAX_PASSES` times for this chunk.
    pub async fn synthesize(&self, chunk: &TextChunk) -> Result<EncodedAudioSegment, NarrationError> {
        let pool_size = self.credentials.len();
        if pool_size == 0 {
            return Err(NarrationError::SynthesisExhausted {
                chunk_index: chunk.index,
                attempts: 0,
                last_error: "no credentials configured".to_string(),
            });
        }

        let start = self.credentials.start();
        let max_attempts = pool_size * MAX_PASSES;
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            let slot = (start + attempt) % pool_size;
            let Some(api_key) = self.credentials.key(slot) else {
                continue;
            };

            match self.tts_repo.synthesize(&chunk.text, api_key).await {
                Ok(audio) => {
                    tracing::debug!(
                        chunk_index = chunk.index,
                        credential_slot = slot,
                        attempt,
                        audio_size = audio.bytes.len(),
                        "Chunk synthesized"
                    );
                    return Ok(EncodedAudioSegment {
                        chunk_index: chunk.index,
                        container_bytes: audio.bytes,
                        format: audio.format,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        chunk_index = chunk.index,
                        credential_slot = slot,
                        attempt,
                        error = %err,
                        "Synthesis attempt failed, rotating credential"
                    );
                    self.credentials.mark_failed(slot);

                    let is_last = attempt + 1 == max_attempts;
                    if err.needs_backoff() && !is_last {
                        tokio::time::sleep(self.backoff_for(attempt / pool_size)).await;
                    }
                    last_error = err.to_string();
                }
            }
        }

        tracing::error!(
            chunk_index = chunk.index,
            attempts = max_attempts,
            last_error = %last_error,
            "Every credential failed for chunk"
        );

        Err(NarrationError::SynthesisExhausted {
            chunk_index: chunk.index,
            attempts: max_attempts,
            last_error,
        })
    }

    /// Doubles on every full pass over the pool.
    fn backoff_for(&self, pass: usize) -> Duration {
        self.backoff * (1u32 << pass.min(8))
    }
}
