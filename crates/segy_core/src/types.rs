use serde::Serialize;

use crate::addressing::TRACE_HEADER_LEN;

/// Byte order of the numeric header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ByteOrder {
    Big,
    /// Whatever the host uses.
    Native,
}

impl ByteOrder {
    #[must_use]
    pub const fn is_big_endian(&self) -> bool {
        matches!(self, Self::Big)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Big => "big-endian",
            Self::Native => "native",
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-trace layout, assumed constant for the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceInfo {
    pub sample_format_code: i32,
    pub samples_per_trace: usize,
    /// Header plus samples.
    pub bytes_per_trace: u64,
}

impl TraceInfo {
    #[inline]
    #[must_use]
    pub fn sample_data_len(&self) -> usize {
        (self.bytes_per_trace - TRACE_HEADER_LEN) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeismicInfo {
    pub num_traces: u64,
}

/// Smallest and largest sample value in the volume. Both are NaN when the
/// volume holds no comparable sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmplitudeRange {
    pub min: f32,
    pub max: f32,
}

impl AmplitudeRange {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_nan() || self.max.is_nan()
    }

    #[must_use]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}
