use crate::error::AppError;

/// Why an audio segment could not be merged. Always fatal for the job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("no audio segments to assemble")]
    NoSegments,
    #[error("unrecognized audio segment: {0}")]
    UnrecognizedSegment(String),
    #[error("corrupt audio container: {0}")]
    CorruptContainer(String),
    #[error("segment {chunk_index} has a different audio format than segment 0")]
    MismatchedFormat { chunk_index: usize },
    #[error("assembled audio of {0} bytes does not fit a wav container")]
    PayloadTooLarge(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("content is empty after normalization")]
    EmptyContent,
    #[error("synthesis exhausted for chunk {chunk_index} after {attempts} attempts: {last_error}")]
    SynthesisExhausted {
        chunk_index: usize,
        attempts: usize,
        last_error: String,
    },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("persistence failed: {0}")]
    Persistence(String),
}

impl From<NarrationError> for AppError {
    fn from(err: NarrationError) -> Self {
        match err {
            NarrationError::EmptyContent => AppError::BadRequest(err.to_string()),
            NarrationError::SynthesisExhausted { .. } | NarrationError::Upload(_) => {
                AppError::ExternalService(err.to_string())
            }
            NarrationError::Assembly(_) | NarrationError::Persistence(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
