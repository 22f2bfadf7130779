//! Survey grid derived from the header scan, and the inline/crossline to
//! trace number mapping built on it.
//!
//! Inlines are numbered from the binary header's line number; crosslines are
//! the CMP numbers. Traces are assumed to be stored inline by inline, each
//! inline holding one trace per crossline.

use std::ops::{Range, RangeInclusive};

use serde::Serialize;

use crate::scanners::HeaderExtrema;
use crate::{Result, SegyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeometryInfo {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_cmp: i32,
    pub max_cmp: i32,
    pub min_inline: i64,
    /// Exclusive: `min_inline + num_inlines`.
    pub max_inline: i64,
    pub num_inlines: u64,
    pub min_crossline: i64,
    /// Inclusive.
    pub max_crossline: i64,
    pub num_crosslines: u64,
    pub num_traces: u64,
    /// `nst` of trace 1.
    pub first_trace_samples: i32,
    /// `tswl` of trace 1. Informational only.
    pub first_trace_sequence_number: i32,
}

impl GeometryInfo {
    pub fn from_extrema(
        extrema: &HeaderExtrema,
        line_number: i32,
        num_traces: u64,
        first_trace_samples: i32,
        first_trace_sequence_number: i32,
    ) -> Self {
        let delta = i64::from(extrema.max_cmp) - i64::from(extrema.min_cmp);
        let num_crosslines = delta.unsigned_abs() + 1;
        let num_inlines = num_traces / num_crosslines;

        if num_traces % num_crosslines != 0 {
            tracing::warn!(
                num_traces,
                num_crosslines,
                "Trace count is not a whole number of inlines; trailing traces are off the grid"
            );
        }

        let min_inline = i64::from(line_number);
        Self {
            min_x: extrema.min_x,
            max_x: extrema.max_x,
            min_y: extrema.min_y,
            max_y: extrema.max_y,
            min_cmp: extrema.min_cmp,
            max_cmp: extrema.max_cmp,
            min_inline,
            max_inline: min_inline.saturating_add_unsigned(num_inlines),
            num_inlines,
            min_crossline: i64::from(extrema.min_cmp),
            max_crossline: i64::from(extrema.max_cmp),
            num_crosslines,
            num_traces,
            first_trace_samples,
            first_trace_sequence_number,
        }
    }

    /// `[min_inline, max_inline)`
    #[must_use]
    pub fn inlines(&self) -> Range<i64> {
        self.min_inline..self.max_inline
    }

    /// `[min_crossline, max_crossline]`
    #[must_use]
    pub fn crosslines(&self) -> RangeInclusive<i64> {
        self.min_crossline..=self.max_crossline
    }

    /// True when the traces fill the grid exactly.
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        self.num_inlines.checked_mul(self.num_crosslines) == Some(self.num_traces)
    }

    /// 1-indexed trace number at (`inline`, `crossline`).
    pub fn trace_number_for(&self, inline: i64, crossline: i64) -> Result<u64> {
        if !self.inlines().contains(&inline) || !self.crosslines().contains(&crossline) {
            return Err(SegyError::GridOutOfRange { inline, crossline });
        }

        let il = (inline - self.min_inline) as u64;
        let xl = (crossline - self.min_crossline) as u64;
        Ok(il * self.num_crosslines + xl + 1)
    }
}

/// A set of traces, one sample vector per trace, in traversal order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Section {
    pub traces: Vec<Vec<f32>>,
}

impl Section {
    pub fn new(traces: Vec<Vec<f32>>) -> Self {
        Self { traces }
    }

    #[inline]
    pub fn num_traces(&self) -> usize {
        self.traces.len()
    }

    /// Longest trace; traces in one file normally share a length.
    pub fn samples_per_trace(&self) -> usize {
        self.traces.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Samples × traces, row-major: row `s` holds sample `s` of every trace.
    /// Missing samples of short traces are NaN.
    pub fn to_row_major(&self) -> Vec<f32> {
        let rows = self.samples_per_trace();
        let mut out = Vec::with_capacity(rows * self.traces.len());
        for sample in 0..rows {
            out.extend(
                self.traces
                    .iter()
                    .map(|trace| trace.get(sample).copied().unwrap_or(f32::NAN)),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extrema(min_cmp: i32, max_cmp: i32) -> HeaderExtrema {
        HeaderExtrema {
            min_x: 1000,
            max_x: 2000,
            min_y: 3000,
            max_y: 4000,
            min_cmp,
            max_cmp,
        }
    }

    #[test]
    fn grid_from_extrema() {
        let geometry = GeometryInfo::from_extrema(&extrema(100, 104), 10, 15, 4, 1);
        assert_eq!(geometry.num_crosslines, 5);
        assert_eq!(geometry.num_inlines, 3);
        assert_eq!(geometry.inlines(), 10..13);
        assert_eq!(geometry.crosslines(), 100..=104);
        assert!(geometry.is_rectangular());
    }

    #[test]
    fn trace_number_mapping() {
        let geometry = GeometryInfo::from_extrema(&extrema(100, 104), 10, 15, 4, 1);
        assert_eq!(geometry.trace_number_for(10, 100).unwrap(), 1);
        assert_eq!(geometry.trace_number_for(10, 101).unwrap(), 2);
        assert_eq!(geometry.trace_number_for(11, 100).unwrap(), 6);
        assert_eq!(geometry.trace_number_for(12, 104).unwrap(), 15);
    }

    #[test]
    fn off_grid_positions_fail() {
        let geometry = GeometryInfo::from_extrema(&extrema(100, 104), 10, 15, 4, 1);
        for (il, xl) in [(9, 100), (13, 100), (10, 99), (10, 105)] {
            let err = geometry.trace_number_for(il, xl).unwrap_err();
            assert!(matches!(err, SegyError::GridOutOfRange { .. }));
            assert!(err.is_out_of_range());
        }
    }

    #[test]
    fn ragged_trace_count() {
        let geometry = GeometryInfo::from_extrema(&extrema(1, 4), 1, 10, 4, 1);
        assert_eq!(geometry.num_inlines, 2);
        assert_eq!(geometry.max_inline, 3);
        assert!(!geometry.is_rectangular());
    }

    #[test]
    fn single_cmp_survey() {
        let geometry = GeometryInfo::from_extrema(&extrema(7, 7), 1, 3, 4, 1);
        assert_eq!(geometry.num_crosslines, 1);
        assert_eq!(geometry.num_inlines, 3);
        assert_eq!(geometry.trace_number_for(3, 7).unwrap(), 3);
    }

    #[test]
    fn section_transposes_to_row_major() {
        let section = Section::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(section.samples_per_trace(), 3);
        assert_eq!(section.to_row_major(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        let ragged = Section::new(vec![vec![1.0, 2.0], vec![3.0]]);
        let rows = ragged.to_row_major();
        assert_eq!(&rows[..3], &[1.0, 3.0, 2.0]);
        assert!(rows[3].is_nan());
    }
}
