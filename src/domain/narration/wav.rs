//! Canonical RIFF/WAVE layout for linear PCM.
//!
//! ```text
//! offset  size  field
//!  0      4     "RIFF"
//!  4      4     36 + data_len            (LE)
//!  8      4     "WAVE"
//! 12      4     "fmt "
//! 16      4     16                       (PCM fmt chunk size)
//! 20      2     1                        (PCM)
//! 22      2     channels
//! 24      4     sample_rate
//! 28      4     byte_rate
//! 32      2     block_align
//! 34      2     bits_per_sample
//! 36      4     "data"
//! 40      4     data_len
//! 44      ...   samples
//! ```

use super::error::AssemblyError;
use super::model::AudioFormat;
use std::io::Cursor;
use std::ops::Range;

pub const HEADER_LEN: usize = 44;

const RIFF: &[u8; 4] = b"RIFF";
const WAVE: &[u8; 4] = b"WAVE";
const FMT: &[u8; 4] = b"fmt ";
const DATA: &[u8; 4] = b"data";
const PCM_FORMAT_TAG: u16 = 1;
const PCM_FMT_CHUNK_LEN: u32 = 16;

/// Streaming encoders write one of these when the final length is unknown.
const UNKNOWN_DATA_LEN: [u32; 2] = [0, u32::MAX];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format: AudioFormat,
    pub data_len: u32,
    block_align: u16,
    byte_rate: u32,
    riff_len: u32,
}

impl WavHeader {
    pub fn new(format: AudioFormat, data_len: u32) -> Result<Self, AssemblyError> {
        let (block_align, byte_rate) = match (format.block_align(), format.byte_rate()) {
            (Some(block_align), Some(byte_rate)) if format.is_valid() => (block_align, byte_rate),
            _ => {
                return Err(AssemblyError::CorruptContainer(format!(
                    "unusable pcm format: {} ch, {} Hz, {} bit",
                    format.channels, format.sample_rate, format.bits_per_sample
                )))
            }
        };
        let riff_len = data_len
            .checked_add(36)
            .ok_or(AssemblyError::PayloadTooLarge(data_len as usize))?;

        Ok(Self {
            format,
            data_len,
            block_align,
            byte_rate,
            riff_len,
        })
    }

    /// The only place a header is serialized.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(RIFF);
        out[4..8].copy_from_slice(&self.riff_len.to_le_bytes());
        out[8..12].copy_from_slice(WAVE);
        out[12..16].copy_from_slice(FMT);
        out[16..20].copy_from_slice(&PCM_FMT_CHUNK_LEN.to_le_bytes());
        out[20..22].copy_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
        out[22..24].copy_from_slice(&self.format.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.format.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.format.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(DATA);
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }
}

/// A parsed container: its PCM format and where the samples live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavContainer {
    pub format: AudioFormat,
    pub data: Range<usize>,
}

pub fn has_riff_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == RIFF && &bytes[8..12] == WAVE
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Reads the container with `hound`, which walks the chunk list and checks the
/// `fmt ` fields. The reader stops right after the `data` chunk header, so the
/// cursor position is where the samples begin.
pub fn parse(bytes: &[u8]) -> Result<WavContainer, AssemblyError> {
    if !has_riff_magic(bytes) {
        return Err(AssemblyError::CorruptContainer(
            "missing RIFF/WAVE magic".to_string(),
        ));
    }

    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| AssemblyError::CorruptContainer(e.to_string()))?;

    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int {
        return Err(AssemblyError::UnrecognizedSegment(format!(
            "unsupported {:?} samples",
            spec.sample_format
        )));
    }

    let format = AudioFormat {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
    };
    if !format.is_valid() {
        return Err(AssemblyError::CorruptContainer(format!(
            "unusable pcm format: {} ch, {} Hz, {} bit",
            format.channels, format.sample_rate, format.bits_per_sample
        )));
    }

    let body = reader.into_inner().position() as usize;
    let declared = body
        .checked_sub(4)
        .and_then(|at| read_u32(bytes, at))
        .ok_or_else(|| AssemblyError::CorruptContainer("truncated data chunk".to_string()))?;

    let remaining = bytes.len().saturating_sub(body);
    let len = if UNKNOWN_DATA_LEN.contains(&declared) {
        remaining
    } else if declared as usize > remaining {
        return Err(AssemblyError::CorruptContainer(format!(
            "data chunk declares {} bytes but only {} follow",
            declared, remaining
        )));
    } else {
        declared as usize
    };

    Ok(WavContainer {
        format,
        data: body..body + len,
    })
}
