use super::error::AssemblyError;
use super::model::{AssembledAudio, AudioFormat, EncodedAudioSegment};
use super::wav::{self, WavHeader, HEADER_LEN};

/// Largest payload whose RIFF size field (`36 + data_len`) still fits in a u32.
const MAX_DATA_LEN: usize = (u32::MAX - 36) as usize;

/// Merge ordered segments into one WAV file with a single header.
///
/// Segments that arrive wrapped in their own RIFF container are unwrapped by
/// walking their chunk list; anything else is taken as raw PCM in the
/// segment's declared format. Every segment must share the first segment's
/// format.
pub fn assemble(segments: &[EncodedAudioSegment]) -> Result<AssembledAudio, AssemblyError> {
    if segments.is_empty() {
        return Err(AssemblyError::NoSegments);
    }

    let mut format: Option<AudioFormat> = None;
    let mut samples: Vec<&[u8]> = Vec::with_capacity(segments.len());

    for (position, segment) in segments.iter().enumerate() {
        if segment.chunk_index != position {
            return Err(AssemblyError::UnrecognizedSegment(format!(
                "segment for chunk {} found at position {}",
                segment.chunk_index, position
            )));
        }

        let (segment_format, data) = raw_samples(segment)?;

        match format {
            None => format = Some(segment_format),
            Some(expected) if expected != segment_format => {
                return Err(AssemblyError::MismatchedFormat {
                    chunk_index: segment.chunk_index,
                });
            }
            Some(_) => {}
        }

        samples.push(data);
    }

    let format = format.ok_or(AssemblyError::NoSegments)?;
    let data_len: usize = samples.iter().map(|s| s.len()).sum();
    if data_len > MAX_DATA_LEN {
        return Err(AssemblyError::PayloadTooLarge(data_len));
    }
    let data_len = data_len as u32;

    let header = WavHeader::new(format, data_len)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + data_len as usize);
    bytes.extend_from_slice(&header.encode());
    for data in samples {
        bytes.extend_from_slice(data);
    }

    Ok(AssembledAudio {
        bytes,
        format,
        data_len,
    })
}

fn raw_samples(segment: &EncodedAudioSegment) -> Result<(AudioFormat, &[u8]), AssemblyError> {
    let bytes = segment.container_bytes.as_slice();

    let (format, data) = if wav::has_riff_magic(bytes) {
        let container = wav::parse(bytes)?;
        (container.format, &bytes[container.data])
    } else if segment.format.is_valid() {
        (segment.format, bytes)
    } else {
        return Err(AssemblyError::UnrecognizedSegment(format!(
            "chunk {} declares an unusable pcm format",
            segment.chunk_index
        )));
    };

    // a partial frame would shift every later segment by a byte
    let block_align = format.block_align().unwrap_or(0) as usize;
    if data.is_empty() || block_align == 0 || data.len() % block_align != 0 {
        return Err(AssemblyError::UnrecognizedSegment(format!(
            "chunk {} carries {} bytes, not whole {}-byte pcm frames",
            segment.chunk_index,
            data.len(),
            block_align
        )));
    }

    Ok((format, data))
}
