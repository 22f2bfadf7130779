//! Full-volume scans: one pass over every trace, split into contiguous
//! batches that are folded in parallel and merged.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::addressing::{FILE_HEADER_LEN, TRACE_HEADER_LEN, trace_byte_offset, trace_data_offset};
use crate::codec::decode_samples_as;
use crate::fields::{CMP, SOURCE_X, SOURCE_Y, decode_field, trace_header_table};
use crate::types::{AmplitudeRange, ByteOrder, TraceInfo};
use crate::{BlockSource, Result, SegyError};

/// How a volume scan is run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Fold batches on the rayon pool instead of the calling thread
    pub parallel: bool,
    /// Traces per unit of work
    pub traces_per_batch: usize,
    /// Cleared to cancel a running scan
    pub running: Arc<AtomicBool>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            traces_per_batch: 256,
            running: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares a cancellation flag, e.g. one cleared by a Ctrl-C handler
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Sets the batch size (at least one trace)
    pub fn with_traces_per_batch(mut self, traces: usize) -> Self {
        self.traces_per_batch = traces.max(1);
        self
    }

    /// Disables parallel scanning
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        !self.running.load(Ordering::SeqCst)
    }
}

/// Coordinate and CMP bounds over every trace header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderExtrema {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_cmp: i32,
    pub max_cmp: i32,
}

/// Inclusive `[first, last]` runs of trace numbers covering `1..=num_traces`.
fn batches(num_traces: u64, traces_per_batch: usize) -> Vec<(u64, u64)> {
    let step = traces_per_batch.max(1) as u64;
    (0..num_traces.div_ceil(step))
        .map(|i| {
            let first = i * step + 1;
            (first, (first + step - 1).min(num_traces))
        })
        .collect()
}

/// Folds `visit` over every trace number, batch by batch, and merges the
/// per-batch accumulators.
fn fold_traces<A, V, M>(num_traces: u64, options: &ScanOptions, visit: V, merge: M) -> Result<A>
where
    A: Default + Send,
    V: Fn(&mut A, u64) -> Result<()> + Sync,
    M: Fn(A, A) -> A + Sync,
{
    let run_batch = |(first, last): (u64, u64)| -> Result<A> {
        let mut acc = A::default();
        for trace in first..=last {
            if options.is_cancelled() {
                return Err(SegyError::Cancelled);
            }
            visit(&mut acc, trace)?;
        }
        Ok(acc)
    };

    let work = batches(num_traces, options.traces_per_batch);
    if options.parallel {
        work.into_par_iter()
            .map(run_batch)
            .try_reduce(A::default, |a, b| Ok(merge(a, b)))
    } else {
        work.into_iter()
            .try_fold(A::default(), |acc, batch| Ok(merge(acc, run_batch(batch)?)))
    }
}

#[derive(Debug, Default)]
struct Bounds<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    // A NaN compares false both ways, so it never becomes a bound.
    fn push(&mut self, value: T) {
        if value.partial_cmp(&value).is_none() {
            return;
        }
        if self.min.is_none_or(|min| value < min) {
            self.min = Some(value);
        }
        if self.max.is_none_or(|max| value > max) {
            self.max = Some(value);
        }
    }

    fn merge(mut self, other: Self) -> Self {
        if let Some(min) = other.min {
            self.push(min);
        }
        if let Some(max) = other.max {
            self.push(max);
        }
        self
    }
}

/// Smallest and largest sample over traces `1..=num_traces`.
///
/// NaN samples are ignored; a volume without a single comparable sample
/// yields `{NaN, NaN}`.
pub fn scan_amplitude<S: BlockSource + ?Sized>(
    source: &S,
    trace_info: &TraceInfo,
    num_traces: u64,
    options: &ScanOptions,
) -> Result<AmplitudeRange> {
    let format = trace_info.sample_format()?;
    let stride = trace_info.bytes_per_trace;
    let data_len = trace_info.sample_data_len();
    let started = Instant::now();
    tracing::info!(num_traces, parallel = options.parallel, "Amplitude scan started");

    let bounds = fold_traces(
        num_traces,
        options,
        |bounds: &mut Bounds<f32>, trace| {
            let mut data = vec![0u8; data_len];
            source.read_exact_at(trace_data_offset(trace, stride)?, &mut data)?;
            for sample in decode_samples_as(&data, trace_info.samples_per_trace, format)? {
                bounds.push(sample);
            }
            Ok(())
        },
        Bounds::merge,
    )?;

    let range = AmplitudeRange {
        min: bounds.min.unwrap_or(f32::NAN),
        max: bounds.max.unwrap_or(f32::NAN),
    };
    tracing::info!(
        min = range.min,
        max = range.max,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Amplitude scan finished"
    );
    Ok(range)
}

#[derive(Debug, Default)]
struct HeaderBounds {
    x: Bounds<i32>,
    y: Bounds<i32>,
    cmp: Bounds<i32>,
}

/// Source coordinate and CMP bounds over the headers of traces `1..=num_traces`.
///
/// A file without traces has no bounds and fails with
/// [`SegyError::OutOfRange`] on the first trace header.
pub fn scan_header_extrema<S: BlockSource + ?Sized>(
    source: &S,
    order: ByteOrder,
    bytes_per_trace: u64,
    num_traces: u64,
    options: &ScanOptions,
) -> Result<HeaderExtrema> {
    if num_traces == 0 {
        return Err(SegyError::OutOfRange {
            offset: FILE_HEADER_LEN,
            len: TRACE_HEADER_LEN,
            max: source.size(),
        });
    }

    let table = trace_header_table();
    let (scx, scy, cmp) = (
        table.field(SOURCE_X)?,
        table.field(SOURCE_Y)?,
        table.field(CMP)?,
    );
    let started = Instant::now();
    tracing::info!(num_traces, parallel = options.parallel, "Header scan started");

    let bounds = fold_traces(
        num_traces,
        options,
        |bounds: &mut HeaderBounds, trace| {
            let mut region = [0u8; TRACE_HEADER_LEN as usize];
            source.read_exact_at(trace_byte_offset(trace, bytes_per_trace)?, &mut region)?;
            bounds.x.push(decode_field(&region, scx, order)?);
            bounds.y.push(decode_field(&region, scy, order)?);
            bounds.cmp.push(decode_field(&region, cmp, order)?);
            Ok(())
        },
        |a: HeaderBounds, b: HeaderBounds| HeaderBounds {
            x: a.x.merge(b.x),
            y: a.y.merge(b.y),
            cmp: a.cmp.merge(b.cmp),
        },
    )?;

    // Every visited trace pushed a value, so with num_traces > 0 all bounds are set.
    let extrema = HeaderExtrema {
        min_x: bounds.x.min.unwrap_or_default(),
        max_x: bounds.x.max.unwrap_or_default(),
        min_y: bounds.y.min.unwrap_or_default(),
        max_y: bounds.y.max.unwrap_or_default(),
        min_cmp: bounds.cmp.min.unwrap_or_default(),
        max_cmp: bounds.cmp.max.unwrap_or_default(),
    };
    tracing::info!(
        min_cmp = extrema.min_cmp,
        max_cmp = extrema.max_cmp,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Header scan finished"
    );
    Ok(extrema)
}
