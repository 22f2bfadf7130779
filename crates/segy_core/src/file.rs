//! `SegyFile`: the open volume and its lazily derived metadata.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use crate::addressing::{FILE_HEADER_LEN, TEXT_HEADER_LEN, TRACE_HEADER_LEN};
use crate::addressing::{trace_byte_offset, trace_data_offset};
use crate::codec::decode_samples_as;
use crate::fields::{
    LINE_NUMBER, SAMPLE_FORMAT, TRACE_SAMPLES, TRACE_SEQUENCE_IN_LINE, trace_header_table,
};
use crate::geometry::{GeometryInfo, Section};
use crate::headers::{HeaderValues, TraceHeaderTable, parse_binary_header, parse_trace_header};
use crate::io::Reader;
use crate::scanners::{ScanOptions, scan_amplitude, scan_header_extrema};
use crate::text_header::{TextHeader, read_text_header};
use crate::types::{AmplitudeRange, ByteOrder, SeismicInfo, TraceInfo};
use crate::{BlockSource, Result};

/// How a volume is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Forces the header byte order instead of inferring it from the text
    /// header's encoding
    pub byte_order: Option<ByteOrder>,
    /// Memory-map the file when the platform allows it
    pub prefer_mmap: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            byte_order: None,
            prefer_mmap: true,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = Some(order);
        self
    }

    /// Reads through a file handle even where mmap would work
    pub fn without_mmap(mut self) -> Self {
        self.prefer_mmap = false;
        self
    }
}

/// A read-only SEG-Y volume.
///
/// Every derived structure (headers, layout, scans) is computed on first use
/// and cached. A failed computation caches nothing, so it is attempted again
/// on the next call. Trace headers and samples are never cached.
pub struct SegyFile<S: BlockSource = Reader> {
    path: Option<PathBuf>,
    source: S,
    options: OpenOptions,
    text_header: OnceCell<TextHeader>,
    binary_header: OnceCell<HeaderValues>,
    trace_info: OnceCell<TraceInfo>,
    seismic_info: OnceCell<SeismicInfo>,
    amplitude: OnceCell<AmplitudeRange>,
    geometry: OnceCell<GeometryInfo>,
}

impl SegyFile<Reader> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let reader = Reader::open(path, options.prefer_mmap)?;
        tracing::debug!(
            path = %path.display(),
            size = reader.size(),
            mmap = reader.is_mmap(),
            "Opened SEG-Y file"
        );

        let mut file = Self::from_source(reader, options);
        file.path = Some(path.to_path_buf());
        Ok(file)
    }
}

impl<S: BlockSource> SegyFile<S> {
    /// Wraps an already open source. Nothing is read until a query needs it.
    pub fn from_source(source: S, options: OpenOptions) -> Self {
        Self {
            path: None,
            source,
            options,
            text_header: OnceCell::new(),
            binary_header: OnceCell::new(),
            trace_info: OnceCell::new(),
            seismic_info: OnceCell::new(),
            amplitude: OnceCell::new(),
            geometry: OnceCell::new(),
        }
    }

    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.source.size()
    }

    pub fn text_header(&self) -> Result<&TextHeader> {
        self.text_header.get_or_try_init(|| {
            let header = read_text_header(&self.source)?;
            tracing::debug!(encoding = %header.encoding(), "Decoded text header");
            Ok(header)
        })
    }

    /// Byte order of every numeric header field: the override from
    /// [`OpenOptions`] if given, else what the text header implies.
    pub fn byte_order(&self) -> Result<ByteOrder> {
        match self.options.byte_order {
            Some(order) => Ok(order),
            None => Ok(self.text_header()?.byte_order()),
        }
    }

    pub fn binary_header(&self) -> Result<&HeaderValues> {
        self.binary_header.get_or_try_init(|| {
            let order = self.byte_order()?;
            let mut region = vec![0u8; (FILE_HEADER_LEN - TEXT_HEADER_LEN) as usize];
            self.source.read_exact_at(TEXT_HEADER_LEN, &mut region)?;
            parse_binary_header(&region, order)
        })
    }

    /// Sample format from the binary header, sample count from trace 1.
    pub fn trace_info(&self) -> Result<&TraceInfo> {
        self.trace_info.get_or_try_init(|| {
            let order = self.byte_order()?;
            let code = self.binary_header()?.value(SAMPLE_FORMAT)?;
            let samples = self.first_trace_field(TRACE_SAMPLES, order)?;
            let info = TraceInfo::new(code, samples)?;
            tracing::debug!(
                format = code,
                samples = info.samples_per_trace,
                stride = info.bytes_per_trace,
                "Derived trace layout"
            );
            Ok(info)
        })
    }

    pub fn seismic_info(&self) -> Result<&SeismicInfo> {
        self.seismic_info.get_or_try_init(|| {
            let info = SeismicInfo::from_file_size(self.source.size(), self.trace_info()?)?;
            tracing::debug!(num_traces = info.num_traces, "Derived trace count");
            Ok(info)
        })
    }

    #[inline]
    pub fn num_traces(&self) -> Result<u64> {
        Ok(self.seismic_info()?.num_traces)
    }

    /// Decodes trace `trace`'s header. Not cached.
    pub fn trace_header(&self, trace: u64) -> Result<HeaderValues> {
        self.seismic_info()?.check_trace(trace)?;
        let order = self.byte_order()?;
        let region = self.read_trace_header_region(trace)?;
        parse_trace_header(&region, order)
    }

    /// One freshly decoded column per requested trace, in request order.
    /// Duplicates are decoded again.
    pub fn trace_headers(&self, traces: &[u64]) -> Result<TraceHeaderTable> {
        let columns = traces
            .iter()
            .map(|&trace| self.trace_header(trace))
            .collect::<Result<Vec<_>>>()?;
        Ok(TraceHeaderTable::new(traces.to_vec(), columns))
    }

    /// The samples of trace `trace` (1-indexed), widened to `f32`.
    pub fn read_trace(&self, trace: u64) -> Result<Vec<f32>> {
        let info = *self.trace_info()?;
        self.seismic_info()?.check_trace(trace)?;

        let mut data = vec![0u8; info.sample_data_len()];
        self.source
            .read_exact_at(trace_data_offset(trace, info.bytes_per_trace)?, &mut data)?;
        decode_samples_as(&data, info.samples_per_trace, info.sample_format()?)
    }

    /// Traces `first..end`, end exclusive.
    pub fn traces_in_range(&self, first: u64, end: u64) -> Result<Section> {
        (first..end)
            .map(|trace| self.read_trace(trace))
            .collect::<Result<Vec<_>>>()
            .map(Section::new)
    }

    /// Smallest and largest sample of the volume, scanned once with default
    /// [`ScanOptions`].
    pub fn amplitude_extrema(&self) -> Result<AmplitudeRange> {
        self.scan_amplitude_extrema(&ScanOptions::default())
    }

    /// Like [`amplitude_extrema`](Self::amplitude_extrema) with explicit scan
    /// options. A cached result is returned without scanning.
    pub fn scan_amplitude_extrema(&self, options: &ScanOptions) -> Result<AmplitudeRange> {
        self.amplitude
            .get_or_try_init(|| {
                let info = self.trace_info()?;
                scan_amplitude(&self.source, info, self.num_traces()?, options)
            })
            .copied()
    }

    /// Survey geometry, scanned once with default [`ScanOptions`].
    pub fn geometry(&self) -> Result<&GeometryInfo> {
        self.scan_header_extrema(&ScanOptions::default())
    }

    /// Scans every trace header for coordinate and CMP bounds and derives
    /// the inline/crossline grid. A cached result is returned without scanning.
    pub fn scan_header_extrema(&self, options: &ScanOptions) -> Result<&GeometryInfo> {
        self.geometry.get_or_try_init(|| {
            let order = self.byte_order()?;
            let stride = self.trace_info()?.bytes_per_trace;
            let num_traces = self.num_traces()?;

            let extrema = scan_header_extrema(&self.source, order, stride, num_traces, options)?;
            let line_number = self.binary_header()?.value(LINE_NUMBER)?;
            let first_trace_samples = self.first_trace_field(TRACE_SAMPLES, order)?;
            let first_trace_sequence_number =
                self.first_trace_field(TRACE_SEQUENCE_IN_LINE, order)?;

            Ok(GeometryInfo::from_extrema(
                &extrema,
                line_number,
                num_traces,
                first_trace_samples,
                first_trace_sequence_number,
            ))
        })
    }

    pub fn trace_number_for(&self, inline: i64, crossline: i64) -> Result<u64> {
        self.geometry()?.trace_number_for(inline, crossline)
    }

    pub fn trace_values_at(&self, inline: i64, crossline: i64) -> Result<Vec<f32>> {
        self.read_trace(self.trace_number_for(inline, crossline)?)
    }

    /// All crosslines of `inline`, in crossline order.
    pub fn traces_for_inline(&self, inline: i64) -> Result<Section> {
        let geometry = self.geometry()?;
        let first = geometry.trace_number_for(inline, geometry.min_crossline)?;
        self.traces_in_range(first, first + geometry.num_crosslines)
    }

    /// One trace per inline in `[min_inline, max_inline)` at `crossline`.
    pub fn traces_for_crossline(&self, crossline: i64) -> Result<Section> {
        let geometry = self.geometry()?;
        geometry
            .inlines()
            .map(|inline| self.trace_values_at(inline, crossline))
            .collect::<Result<Vec<_>>>()
            .map(Section::new)
    }

    fn read_trace_header_region(&self, trace: u64) -> Result<[u8; TRACE_HEADER_LEN as usize]> {
        let stride = self.trace_info()?.bytes_per_trace;
        let mut region = [0u8; TRACE_HEADER_LEN as usize];
        self.source
            .read_exact_at(trace_byte_offset(trace, stride)?, &mut region)?;
        Ok(region)
    }

    /// Decodes one field of trace 1's header straight from the file, which
    /// works before the stride is known.
    fn first_trace_field(&self, name: &str, order: ByteOrder) -> Result<i32> {
        let mut region = [0u8; TRACE_HEADER_LEN as usize];
        self.source.read_exact_at(FILE_HEADER_LEN, &mut region)?;
        trace_header_table().decode(&region, name, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegyError;

    fn two_trace_volume() -> Vec<u8> {
        let mut data = vec![b' '; TEXT_HEADER_LEN as usize];
        let mut binary = [0u8; 400];
        binary[4..8].copy_from_slice(&1i32.to_be_bytes());
        binary[24..26].copy_from_slice(&5i16.to_be_bytes());
        data.extend_from_slice(&binary);
        for (n, value) in [(1i32, 1.0f32), (2, 2.0)] {
            let mut header = [0u8; 240];
            header[0..4].copy_from_slice(&n.to_be_bytes());
            header[20..24].copy_from_slice(&n.to_be_bytes());
            header[114..116].copy_from_slice(&4i16.to_be_bytes());
            data.extend_from_slice(&header);
            for _ in 0..4 {
                data.extend_from_slice(&value.to_be_bytes());
            }
        }
        // EBCDIC 'C' makes the text header non-ASCII: big-endian fields.
        data[0] = 0xC3;
        data
    }

    #[test]
    fn layout_and_traces() {
        let file = SegyFile::from_source(two_trace_volume(), OpenOptions::default());
        assert_eq!(file.byte_order().unwrap(), ByteOrder::Big);
        assert_eq!(file.trace_info().unwrap().bytes_per_trace, 256);
        assert_eq!(file.num_traces().unwrap(), 2);
        assert_eq!(file.read_trace(1).unwrap(), vec![1.0; 4]);
        assert_eq!(file.read_trace(2).unwrap(), vec![2.0; 4]);
        assert!(file.read_trace(3).unwrap_err().is_out_of_range());
        assert!(file.read_trace(0).unwrap_err().is_out_of_range());
    }

    #[test]
    fn byte_order_override_wins() {
        let options = OpenOptions::new().with_byte_order(ByteOrder::Big);
        let mut data = two_trace_volume();
        data[0] = b' ';
        let file = SegyFile::from_source(data, options);
        assert_eq!(file.byte_order().unwrap(), ByteOrder::Big);
        assert_eq!(file.num_traces().unwrap(), 2);
    }

    #[test]
    fn failed_derivation_is_not_cached() {
        let file = SegyFile::from_source(vec![0u8; 100], OpenOptions::default());
        assert!(file.text_header().is_err());
        assert!(file.num_traces().is_err());
        assert!(file.text_header().is_err());
    }

    #[test]
    fn trace_headers_keep_request_order() {
        let file = SegyFile::from_source(two_trace_volume(), OpenOptions::default());
        let table = file.trace_headers(&[2, 1, 2]).unwrap();
        assert_eq!(table.trace_numbers(), &[2, 1, 2]);
        assert_eq!(table.row("tswl"), Some(vec![2, 1, 2]));
        assert!(matches!(
            file.trace_headers(&[1, 5]).unwrap_err(),
            SegyError::TraceOutOfRange { trace: 5, .. }
        ));
    }

    #[test]
    fn scans_are_cached() {
        let file = SegyFile::from_source(two_trace_volume(), OpenOptions::default());
        let range = file.amplitude_extrema().unwrap();
        assert_eq!(range, AmplitudeRange { min: 1.0, max: 2.0 });

        // A cancelled options set cannot scan, so a hit proves the cache.
        let cancelled = ScanOptions::default()
            .with_running(std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)));
        assert_eq!(file.scan_amplitude_extrema(&cancelled).unwrap(), range);
    }
}
