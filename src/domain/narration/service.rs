use super::assembler::assemble;
use super::chunk_planner::plan;
use super::dto::NarrationAck;
use super::error::NarrationError;
use super::model::{JobState, NarrationRecord, NarrationRequest};
use super::normalizer::normalize;
use super::synthesizer::SpeechSynthesizer;
use crate::infrastructure::repositories::{AudioStorageRepository, NarrationRecordRepository};
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

pub struct NarrationService {
    synthesizer: SpeechSynthesizer,
    storage_repo: Arc<dyn AudioStorageRepository>,
    record_repo: Arc<dyn NarrationRecordRepository>,
    max_chunk_bytes: usize,
    concurrency: usize,
}

impl NarrationService {
    pub fn new(
        synthesizer: SpeechSynthesizer,
        storage_repo: Arc<dyn AudioStorageRepository>,
        record_repo: Arc<dyn NarrationRecordRepository>,
        max_chunk_bytes: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            synthesizer,
            storage_repo,
            record_repo,
            max_chunk_bytes: max_chunk_bytes.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// Dispatches the job on its own task and acknowledges immediately.
    /// The outcome is only observable through the topic's narration URL.
    pub fn start(self: &Arc<Self>, request: NarrationRequest) -> NarrationAck {
        let topic_id = request.topic_id;
        let service = Arc::clone(self);

        tokio::spawn(async move {
            // errors are logged inside narrate
            let _ = service.narrate(request).await;
        });

        NarrationAck {
            started: true,
            topic_id,
        }
    }
}

#[async_trait]
pub trait NarrationServiceApi: Send + Sync {
    /// Run the whole pipeline for one topic
    ///
    /// This operation:
    /// - Normalizes and chunks the content
    /// - Synthesizes every chunk, rotating credentials on failure
    /// - Assembles one WAV file, uploads it and attaches its URL to the topic
    ///
    /// Any failure abandons the job without touching the topic.
    async fn narrate(&self, request: NarrationRequest) -> Result<NarrationRecord, NarrationError>;
}

#[async_trait]
impl NarrationServiceApi for NarrationService {
    async fn narrate(&self, request: NarrationRequest) -> Result<NarrationRecord, NarrationError> {
        let topic_id = request.topic_id;
        let started_at = Instant::now();

        tracing::info!(
            topic_id,
            title = %request.title,
            content_length = request.raw_content.len(),
            state = %JobState::Received,
            "Narration job received"
        );

        match self.run(request).await {
            Ok(record) => {
                tracing::info!(
                    topic_id,
                    state = %JobState::Persisted,
                    audio_url = %record.audio_url,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "Narration job finished"
                );
                Ok(record)
            }
            Err(err) => {
                tracing::error!(
                    topic_id,
                    state = %JobState::Failed,
                    error = %err,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "Narration job abandoned"
                );
                Err(err)
            }
        }
    }
}

impl NarrationService {
    async fn run(&self, request: NarrationRequest) -> Result<NarrationRecord, NarrationError> {
        let topic_id = request.topic_id;

        // 1. Normalize; the title is never spoken
        transition(topic_id, JobState::Normalizing);
        let text = normalize(&request.raw_content);
        if text.trim().is_empty() {
            return Err(NarrationError::EmptyContent);
        }

        // 2. Plan chunks under the provider byte budget
        transition(topic_id, JobState::Planning);
        let chunks = plan(&text, self.max_chunk_bytes);
        let total = chunks.len();
        tracing::info!(
            topic_id,
            normalized_length = text.len(),
            chunks = total,
            max_chunk_bytes = self.max_chunk_bytes,
            "Narration planned"
        );

        // 3. Synthesize; `buffered` yields in chunk order whatever finishes first
        transition(topic_id, JobState::Synthesizing { done: 0, total });
        let mut segments = Vec::with_capacity(total);
        let calls: Vec<_> = chunks
            .iter()
            .map(|chunk| self.synthesizer.synthesize(chunk))
            .collect();
        let mut results = stream::iter(calls).buffered(self.concurrency);
        while let Some(result) = results.next().await {
            segments.push(result?);
            transition(
                topic_id,
                JobState::Synthesizing {
                    done: segments.len(),
                    total,
                },
            );
        }

        // 4. Assemble one container
        transition(topic_id, JobState::Assembling);
        let audio = assemble(&segments)?;
        tracing::info!(
            topic_id,
            audio_size = audio.bytes.len(),
            data_len = audio.data_len,
            duration_secs = audio.duration_secs(),
            "Narration assembled"
        );

        // 5. Upload under a timestamped path
        transition(topic_id, JobState::Uploading);
        let path = storage_path(topic_id, Utc::now().timestamp_millis());
        let audio_url = self
            .storage_repo
            .upload(&path, audio.bytes)
            .await
            .map_err(NarrationError::Upload)?;

        // 6. Attach the URL, once
        self.record_repo
            .attach_narration(topic_id, &audio_url)
            .await
            .map_err(|e| NarrationError::Persistence(e.to_string()))?;

        Ok(NarrationRecord {
            topic_id,
            audio_url,
        })
    }
}

fn transition(topic_id: i64, state: JobState) {
    tracing::info!(topic_id, state = %state, "Narration state changed");
}

/// `topics/{topic}/narration-{unix_millis}.wav`
pub fn storage_path(topic_id: i64, unix_millis: i64) -> String {
    format!("topics/{}/narration-{}.wav", topic_id, unix_millis)
}
