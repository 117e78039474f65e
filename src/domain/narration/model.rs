use std::fmt;

/// A request to narrate one topic. `title` is only used for logging; it is never
/// spoken because the player already shows it as a header.
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub topic_id: i64,
    pub title: String,
    pub raw_content: String,
}

/// A bounded piece of narration text. `index` is the only reassembly key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
}

/// PCM sample layout shared by every segment of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Mono 16-bit PCM at 24 kHz, what the speech provider emits.
    pub const PROVIDER_DEFAULT: AudioFormat = AudioFormat {
        sample_rate: 24_000,
        channels: 1,
        bits_per_sample: 16,
    };

    /// Bytes per frame, `None` when it does not fit the header field.
    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate
            .checked_mul(u32::from(self.block_align()?))
    }

    /// Whole-byte integer samples, at least one channel, a non-zero rate and
    /// derived fields that fit the canonical header.
    pub fn is_valid(&self) -> bool {
        self.channels > 0
            && self.sample_rate > 0
            && self.bits_per_sample > 0
            && self.bits_per_sample % 8 == 0
            && self.byte_rate().is_some()
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::PROVIDER_DEFAULT
    }
}

/// Audio returned by the provider for a single chunk, before header stripping.
#[derive(Debug, Clone)]
pub struct EncodedAudioSegment {
    pub chunk_index: usize,
    pub container_bytes: Vec<u8>,
    pub format: AudioFormat,
}

/// A finished WAV file: one 44-byte header followed by every segment's samples.
#[derive(Debug, Clone)]
pub struct AssembledAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    pub data_len: u32,
}

impl AssembledAudio {
    pub fn duration_secs(&self) -> f64 {
        match self.format.byte_rate() {
            Some(rate) if rate > 0 => self.data_len as f64 / rate as f64,
            _ => 0.0,
        }
    }
}

/// Persisted pointer from a topic to its narration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationRecord {
    pub topic_id: i64,
    pub audio_url: String,
}

/// Lifecycle of a narration job. Any state may move to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Received,
    Normalizing,
    Planning,
    Synthesizing { done: usize, total: usize },
    Assembling,
    Uploading,
    Persisted,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Received => write!(f, "received"),
            JobState::Normalizing => write!(f, "normalizing"),
            JobState::Planning => write!(f, "planning"),
            JobState::Synthesizing { done, total } => write!(f, "synthesizing({}/{})", done, total),
            JobState::Assembling => write!(f, "assembling"),
            JobState::Uploading => write!(f, "uploading"),
            JobState::Persisted => write!(f, "persisted"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}
