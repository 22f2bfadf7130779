//! Fixed file layout and per-trace offset arithmetic.
//!
//! ```text
//! [0, 3200)      textual header
//! [3200, 3600)   binary header
//! [3600, ..)     traces: 240-byte header + samples, repeated
//! ```

use crate::codec::SampleFormat;
use crate::error::{Result, SegyError};
use crate::types::{SeismicInfo, TraceInfo};

pub const TEXT_HEADER_LEN: u64 = 3200;
pub const BINARY_HEADER_LEN: u64 = 400;
pub const FILE_HEADER_LEN: u64 = TEXT_HEADER_LEN + BINARY_HEADER_LEN;
pub const TRACE_HEADER_LEN: u64 = 240;

/// Absolute offset of the header of 1-indexed trace `trace`.
pub fn trace_byte_offset(trace: u64, bytes_per_trace: u64) -> Result<u64> {
    trace
        .checked_sub(1)
        .and_then(|index| index.checked_mul(bytes_per_trace))
        .and_then(|rel| rel.checked_add(FILE_HEADER_LEN))
        .ok_or(SegyError::OutOfRange {
            offset: FILE_HEADER_LEN,
            len: bytes_per_trace,
            max: u64::MAX,
        })
}

/// Absolute offset of the first sample of `trace`.
pub fn trace_data_offset(trace: u64, bytes_per_trace: u64) -> Result<u64> {
    Ok(trace_byte_offset(trace, bytes_per_trace)? + TRACE_HEADER_LEN)
}

impl TraceInfo {
    /// Derives the stride from the format code and the per-trace sample count.
    ///
    /// Fails with [`SegyError::UnrecognizedSampleFormat`] when the code has no
    /// known byte width, since no offset can be computed without one.
    pub fn new(sample_format_code: i32, samples_per_trace: i32) -> Result<Self> {
        let format = SampleFormat::from_code(sample_format_code)?;
        let samples_per_trace = usize::try_from(samples_per_trace).map_err(|_| {
            SegyError::InvalidFormat(format!(
                "negative sample count {samples_per_trace} in first trace header"
            ))
        })?;

        let bytes_per_trace =
            TRACE_HEADER_LEN + (samples_per_trace * format.bytes_per_sample()) as u64;

        Ok(Self {
            sample_format_code,
            samples_per_trace,
            bytes_per_trace,
        })
    }

    /// The decoded format; always valid for a `TraceInfo` built by [`TraceInfo::new`].
    pub fn sample_format(&self) -> Result<SampleFormat> {
        SampleFormat::from_code(self.sample_format_code)
    }
}

impl SeismicInfo {
    /// Number of traces implied by the file size.
    ///
    /// The trace area must divide exactly into strides; anything else means the
    /// file is truncated or its headers lie about the layout.
    pub fn from_file_size(file_size: u64, trace_info: &TraceInfo) -> Result<Self> {
        let stride = trace_info.bytes_per_trace;
        let trace_area = file_size
            .checked_sub(FILE_HEADER_LEN)
            .ok_or(SegyError::OutOfRange {
                offset: 0,
                len: FILE_HEADER_LEN,
                max: file_size,
            })?;

        if trace_area % stride != 0 {
            return Err(SegyError::InconsistentFileSize {
                size: file_size,
                stride,
            });
        }

        Ok(Self {
            num_traces: trace_area / stride,
        })
    }

    /// Fails unless `1 <= trace <= num_traces`.
    pub fn check_trace(&self, trace: u64) -> Result<()> {
        if trace == 0 || trace > self.num_traces {
            return Err(SegyError::TraceOutOfRange {
                trace,
                num_traces: self.num_traces,
            });
        }
        Ok(())
    }
}
