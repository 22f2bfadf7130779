//! Decoding core for SEG-Y seismic volumes.
//!
//! A volume is a 3200-byte text header, a 400-byte binary header and a run of
//! fixed-size traces. Everything here is read-only and driven by byte offsets:
//! field tables describe the headers, [`SegyFile`] derives the trace layout and
//! survey geometry on demand, and the scanners fold over every trace.

pub mod addressing;
pub mod codec;
mod error;
pub mod fields;
mod file;
pub mod geometry;
pub mod headers;
pub mod io;
pub mod scanners;
pub mod text_header;
mod traits;
mod types;

pub use codec::SampleFormat;
pub use error::{Result, SegyError};
pub use fields::{FieldDescriptor, FieldTable, HeaderKind};
pub use file::{OpenOptions, SegyFile};
pub use geometry::{GeometryInfo, Section};
pub use headers::{HeaderValues, TraceHeaderTable};
pub use io::{DiskReader, MmapReader, Reader};
pub use scanners::{HeaderExtrema, ScanOptions};
pub use text_header::{TextEncoding, TextHeader};
pub use traits::BlockSource;
pub use types::{AmplitudeRange, ByteOrder, SeismicInfo, TraceInfo};
