pub mod gemini_tts_repository;
pub mod narration_record_repository;
pub mod storage_repository;
pub mod tts_repository;

pub use gemini_tts_repository::GeminiTtsRepository;
pub use narration_record_repository::{NarrationRecordRepository, PgNarrationRecordRepository};
pub use storage_repository::{AudioStorageRepository, SupabaseStorageRepository};
pub use tts_repository::{ProviderAudio, ProviderError, TtsRepository};
