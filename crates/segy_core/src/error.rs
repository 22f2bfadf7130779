use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("{len} bytes at offset {offset} are out of bounds (max: {max})")]
    OutOfRange { offset: u64, len: u64, max: u64 },

    #[error("Trace {trace} is out of range (file has {num_traces} traces)")]
    TraceOutOfRange { trace: u64, num_traces: u64 },

    #[error("Inline {inline} / crossline {crossline} lies outside the survey grid")]
    GridOutOfRange { inline: i64, crossline: i64 },

    #[error("Field '{name}' is {width} bytes wide, only 2 or 4 are supported")]
    InvalidFieldWidth { name: &'static str, width: usize },

    #[error("Invalid field table: {0}")]
    InvalidFieldTable(String),

    #[error("Unknown header field: {0}")]
    UnknownField(String),

    #[error("Truncated trace: expected {expected} bytes of samples, got {actual}")]
    TruncatedTrace { expected: usize, actual: usize },

    #[error("Unrecognized data sample format code: {0}")]
    UnrecognizedSampleFormat(i32),

    #[error(
        "Inconsistent file size: {size} bytes minus the 3600-byte header is not a multiple of the {stride}-byte trace stride"
    )]
    InconsistentFileSize { size: u64, stride: u64 },

    #[error("Scan cancelled")]
    Cancelled,
}

impl SegyError {
    /// True for every flavour of out-of-range request (bytes, trace numbers, grid positions).
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::TraceOutOfRange { .. } | Self::GridOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SegyError>;
