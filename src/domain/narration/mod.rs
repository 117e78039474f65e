pub mod assembler;
pub mod chunk_planner;
pub mod credentials;
pub mod dto;
pub mod error;
pub mod legal_terms;
pub mod model;
pub mod normalizer;
pub mod service;
pub mod synthesizer;
pub mod wav;

pub use assembler::assemble;
pub use chunk_planner::plan;
pub use credentials::CredentialPool;
pub use dto::{NarrationAck, NarrationRequestDto};
pub use error::{AssemblyError, NarrationError};
pub use model::{
    AssembledAudio, AudioFormat, EncodedAudioSegment, JobState, NarrationRecord,
    NarrationRequest, TextChunk,
};
pub use normalizer::normalize;
pub use service::{NarrationService, NarrationServiceApi};
pub use synthesizer::SpeechSynthesizer;
