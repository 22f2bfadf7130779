//! Sample codec: data sample format codes, their byte widths, and decoding of
//! a trace's sample array into `f32`.
//!
//! Samples are always read big-endian, independent of the byte order chosen
//! for header fields.

use serde::Serialize;

use crate::error::{Result, SegyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleFormat {
    /// 4-byte IBM floating point (code 1).
    IbmFloat32,
    /// 4-byte two's-complement integer (code 2).
    Int32,
    /// 2-byte two's-complement integer (code 3).
    Int16,
    /// 4-byte fixed point with gain (code 4).
    FixedPointGain32,
    /// 4-byte IEEE floating point (code 5).
    IeeeFloat32,
    /// 1-byte two's-complement integer (code 8).
    Int8,
}

impl SampleFormat {
    /// Maps a binary-header sample format code to a format.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::IbmFloat32),
            2 => Ok(Self::Int32),
            3 => Ok(Self::Int16),
            4 => Ok(Self::FixedPointGain32),
            5 => Ok(Self::IeeeFloat32),
            8 => Ok(Self::Int8),
            _ => Err(SegyError::UnrecognizedSampleFormat(code)),
        }
    }

    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::IbmFloat32 => 1,
            Self::Int32 => 2,
            Self::Int16 => 3,
            Self::FixedPointGain32 => 4,
            Self::IeeeFloat32 => 5,
            Self::Int8 => 8,
        }
    }

    #[must_use]
    pub const fn bytes_per_sample(&self) -> usize {
        match self {
            Self::IbmFloat32 | Self::Int32 | Self::FixedPointGain32 | Self::IeeeFloat32 => 4,
            Self::Int16 => 2,
            Self::Int8 => 1,
        }
    }

    /// Whether [`decode_samples_as`] can turn this format into values.
    ///
    /// IBM floats and gain-ranged fixed point are stride-only: their width is
    /// known but no conversion is implemented.
    #[must_use]
    pub const fn is_decodable(&self) -> bool {
        !matches!(self, Self::IbmFloat32 | Self::FixedPointGain32)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IbmFloat32 => "IBM float32",
            Self::Int32 => "int32",
            Self::Int16 => "int16",
            Self::FixedPointGain32 => "fixed point with gain",
            Self::IeeeFloat32 => "IEEE float32",
            Self::Int8 => "int8",
        }
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// On-disk width of one sample for `code`, or 0 when the code is unrecognized.
#[must_use]
pub fn bytes_per_sample(code: i32) -> usize {
    SampleFormat::from_code(code).map_or(0, |format| format.bytes_per_sample())
}

/// Decodes `count` big-endian IEEE `f32` samples.
pub fn decode_samples(buffer: &[u8], count: usize) -> Result<Vec<f32>> {
    decode_samples_as(buffer, count, SampleFormat::IeeeFloat32)
}

/// Decodes `count` big-endian samples of `format`, widening integers to `f32`.
pub fn decode_samples_as(buffer: &[u8], count: usize, format: SampleFormat) -> Result<Vec<f32>> {
    if !format.is_decodable() {
        return Err(SegyError::UnrecognizedSampleFormat(format.code()));
    }

    let width = format.bytes_per_sample();
    let expected = count.saturating_mul(width);
    if buffer.len() < expected {
        return Err(SegyError::TruncatedTrace {
            expected,
            actual: buffer.len(),
        });
    }

    let data = &buffer[..expected];
    let samples = match format {
        SampleFormat::IeeeFloat32 => data
            .chunks_exact(4)
            .map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        SampleFormat::Int32 => data
            .chunks_exact(4)
            .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f32)
            .collect(),
        SampleFormat::Int16 => data
            .chunks_exact(2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]) as f32)
            .collect(),
        SampleFormat::Int8 => data.iter().map(|&b| b as i8 as f32).collect(),
        SampleFormat::IbmFloat32 | SampleFormat::FixedPointGain32 => {
            return Err(SegyError::UnrecognizedSampleFormat(format.code()));
        }
    };

    Ok(samples)
}
