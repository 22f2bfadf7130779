//! Binary and trace header parsing on top of the field tables.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Result, SegyError};
use crate::fields::{FieldTable, binary_header_table, decode_field, trace_header_table};
use crate::types::ByteOrder;

/// Decoded header values in field-table order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderValues {
    values: Vec<(&'static str, i32)>,
}

impl HeaderValues {
    /// Decodes every field of `table` from `region`, the header's own bytes.
    pub fn decode(table: &FieldTable, region: &[u8], order: ByteOrder) -> Result<Self> {
        let origin = table.kind().origin();
        let values = table
            .iter()
            .map(|field| {
                decode_field(region, &field.relative_to(origin), order)
                    .map(|value| (field.name, value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { values })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }

    /// Like [`get`](Self::get) but fails with [`SegyError::UnknownField`].
    pub fn value(&self, name: &str) -> Result<i32> {
        self.get(name)
            .ok_or_else(|| SegyError::UnknownField(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.values.iter().copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for HeaderValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Decodes the 400-byte binary header region (file bytes 3201..=3600).
pub fn parse_binary_header(region: &[u8], order: ByteOrder) -> Result<HeaderValues> {
    HeaderValues::decode(binary_header_table(), region, order)
}

/// Decodes a 240-byte trace header region.
pub fn parse_trace_header(region: &[u8], order: ByteOrder) -> Result<HeaderValues> {
    HeaderValues::decode(trace_header_table(), region, order)
}

/// Trace headers side by side: one row per field, one column per requested
/// trace number, columns kept in request order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TraceHeaderTable {
    trace_numbers: Vec<u64>,
    columns: Vec<HeaderValues>,
}

impl TraceHeaderTable {
    pub(crate) fn new(trace_numbers: Vec<u64>, columns: Vec<HeaderValues>) -> Self {
        debug_assert_eq!(trace_numbers.len(), columns.len());
        Self {
            trace_numbers,
            columns,
        }
    }

    #[must_use]
    pub fn trace_numbers(&self) -> &[u64] {
        &self.trace_numbers
    }

    /// Field names, in table order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        trace_header_table().iter().map(|f| f.name)
    }

    #[must_use]
    pub fn column(&self, index: usize) -> Option<&HeaderValues> {
        self.columns.get(index)
    }

    /// Values of `field` across all columns.
    #[must_use]
    pub fn row(&self, field: &str) -> Option<Vec<i32>> {
        self.columns.iter().map(|column| column.get(field)).collect()
    }

    #[must_use]
    pub fn value(&self, field: &str, index: usize) -> Option<i32> {
        self.columns.get(index).and_then(|column| column.get(field))
    }

    /// `(field, [(trace, value)...])` rows, the shape tabular presenters consume.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, Vec<(u64, i32)>)> {
        self.fields()
            .map(|field| {
                let cells = self
                    .trace_numbers
                    .iter()
                    .zip(&self.columns)
                    .filter_map(|(&trace, column)| column.get(field).map(|v| (trace, v)))
                    .collect();
                (field, cells)
            })
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::{BINARY_HEADER_LEN, TRACE_HEADER_LEN};
    use crate::fields::{CMP, LINE_NUMBER, SAMPLE_FORMAT, SOURCE_X, TRACE_SAMPLES};

    fn trace_region(cmp: i32, scx: i32, samples: i16) -> Vec<u8> {
        let mut region = vec![0u8; TRACE_HEADER_LEN as usize];
        region[20..24].copy_from_slice(&cmp.to_be_bytes());
        region[72..76].copy_from_slice(&scx.to_be_bytes());
        region[114..116].copy_from_slice(&samples.to_be_bytes());
        region
    }

    #[test]
    fn binary_header_values() {
        let mut region = vec![0u8; BINARY_HEADER_LEN as usize];
        region[4..8].copy_from_slice(&1001i32.to_be_bytes());
        region[24..26].copy_from_slice(&5i16.to_be_bytes());

        let header = parse_binary_header(&region, ByteOrder::Big).unwrap();
        assert_eq!(header.len(), 30);
        assert_eq!(header.get(LINE_NUMBER), Some(1001));
        assert_eq!(header.value(SAMPLE_FORMAT).unwrap(), 5);
        assert!(header.value("missing").is_err());
    }

    #[test]
    fn trace_header_values() {
        let header = parse_trace_header(&trace_region(42, -1200, 1500), ByteOrder::Big).unwrap();
        assert_eq!(header.len(), 85);
        assert_eq!(header.get(CMP), Some(42));
        assert_eq!(header.get(SOURCE_X), Some(-1200));
        assert_eq!(header.get(TRACE_SAMPLES), Some(1500));
    }

    #[test]
    fn short_trace_region_fails() {
        let err = parse_trace_header(&[0u8; 100], ByteOrder::Big).unwrap_err();
        assert!(err.is_out_of_range());
    }

    #[test]
    fn header_values_serialize_as_ordered_map() {
        let header = parse_trace_header(&trace_region(7, 0, 0), ByteOrder::Big).unwrap();
        let json = serde_json::to_string(&header).unwrap();
        assert!(json.starts_with("{\"tswl\":0,\"tsnwf\":0"));
        assert!(json.contains("\"cmp\":7"));
    }

    #[test]
    fn table_rows_follow_request_order() {
        let first = parse_trace_header(&trace_region(10, 0, 0), ByteOrder::Big).unwrap();
        let second = parse_trace_header(&trace_region(20, 0, 0), ByteOrder::Big).unwrap();
        let table = TraceHeaderTable::new(
            vec![2, 1, 2],
            vec![second.clone(), first, second],
        );

        assert_eq!(table.num_columns(), 3);
        assert_eq!(table.row(CMP), Some(vec![20, 10, 20]));
        assert_eq!(table.value(CMP, 1), Some(10));

        let rows = table.rows();
        let (name, cells) = &rows[5];
        assert_eq!(*name, CMP);
        assert_eq!(cells, &vec![(2, 20), (1, 10), (2, 20)]);
    }
}
