//! Field tables for the binary (file-level) and trace headers.
//!
//! Every header value the crate understands is declared here once as a named,
//! 1-indexed inclusive byte range. Tables are validated when they are built,
//! so decoding never has to second-guess a descriptor.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::addressing::{BINARY_HEADER_LEN, TEXT_HEADER_LEN, TRACE_HEADER_LEN};
use crate::error::{Result, SegyError};
use crate::types::ByteOrder;

/// Binary header: job identification number.
pub const JOB_ID: &str = "jn";
/// Binary header: line number, used as the first inline of the survey.
pub const LINE_NUMBER: &str = "ln";
/// Binary header: data sample format code.
pub const SAMPLE_FORMAT: &str = "dsfc";
/// Trace header: trace sequence number within line.
pub const TRACE_SEQUENCE_IN_LINE: &str = "tswl";
/// Trace header: CDP ensemble number.
pub const CMP: &str = "cmp";
/// Trace header: source coordinate X.
pub const SOURCE_X: &str = "scx";
/// Trace header: source coordinate Y.
pub const SOURCE_Y: &str = "scy";
/// Trace header: number of samples in this trace.
pub const TRACE_SAMPLES: &str = "nst";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HeaderKind {
    Binary,
    Trace,
}

impl HeaderKind {
    /// File offset that precedes byte 1 of this header's descriptors.
    ///
    /// Binary header ranges are declared file-absolute (3201..=3600), trace
    /// header ranges are relative to the start of each trace.
    #[must_use]
    pub const fn origin(&self) -> usize {
        match self {
            Self::Binary => TEXT_HEADER_LEN as usize,
            Self::Trace => 0,
        }
    }

    #[must_use]
    pub const fn region_len(&self) -> usize {
        match self {
            Self::Binary => BINARY_HEADER_LEN as usize,
            Self::Trace => TRACE_HEADER_LEN as usize,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary header",
            Self::Trace => "trace header",
        }
    }
}

/// A named, 1-indexed, inclusive byte range holding a signed integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl FieldDescriptor {
    /// Builds a descriptor, rejecting any width other than 2 or 4 bytes.
    pub fn new(name: &'static str, start_byte: usize, end_byte: usize) -> Result<Self> {
        let field = Self::fixed(name, start_byte, end_byte);
        field.check()?;
        Ok(field)
    }

    const fn fixed(name: &'static str, start_byte: usize, end_byte: usize) -> Self {
        Self {
            name,
            start_byte,
            end_byte,
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.end_byte.saturating_add(1).saturating_sub(self.start_byte)
    }

    /// Same field, renumbered so that byte `origin + 1` becomes byte 1.
    #[must_use]
    pub const fn relative_to(&self, origin: usize) -> Self {
        Self::fixed(
            self.name,
            self.start_byte.saturating_sub(origin),
            self.end_byte.saturating_sub(origin),
        )
    }

    fn check(&self) -> Result<()> {
        if self.start_byte == 0 || self.end_byte < self.start_byte {
            return Err(SegyError::InvalidFieldTable(format!(
                "field '{}' has invalid range {}..={}",
                self.name, self.start_byte, self.end_byte
            )));
        }
        match self.width() {
            2 | 4 => Ok(()),
            width => Err(SegyError::InvalidFieldWidth {
                name: self.name,
                width,
            }),
        }
    }
}

/// Decodes one field from `buffer` as a signed two's-complement integer.
///
/// `buffer[field.start_byte - 1]` is the first byte read. Big-endian order is
/// used for [`ByteOrder::Big`], host order otherwise.
pub fn decode_field(buffer: &[u8], field: &FieldDescriptor, order: ByteOrder) -> Result<i32> {
    let width = field.width();
    let start = field.start_byte.saturating_sub(1);
    let bytes = start
        .checked_add(width)
        .and_then(|end| buffer.get(start..end))
        .filter(|_| field.start_byte > 0)
        .ok_or(SegyError::OutOfRange {
            offset: start as u64,
            len: width as u64,
            max: buffer.len() as u64,
        })?;

    match (width, order) {
        (2, ByteOrder::Big) => Ok(i16::from_be_bytes([bytes[0], bytes[1]]) as i32),
        (2, ByteOrder::Native) => Ok(i16::from_ne_bytes([bytes[0], bytes[1]]) as i32),
        (4, ByteOrder::Big) => Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        (4, ByteOrder::Native) => Ok(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        _ => Err(SegyError::InvalidFieldWidth {
            name: field.name,
            width,
        }),
    }
}

/// An ordered, validated set of field descriptors for one header kind.
#[derive(Debug, Clone)]
pub struct FieldTable {
    kind: HeaderKind,
    fields: Vec<FieldDescriptor>,
}

impl FieldTable {
    /// Validates widths, ranges, name uniqueness and non-overlap.
    ///
    /// Insertion order is kept; it only matters for display.
    pub fn new(kind: HeaderKind, fields: &[FieldDescriptor]) -> Result<Self> {
        let origin = kind.origin();
        let region_len = kind.region_len();

        for (i, field) in fields.iter().enumerate() {
            field.check()?;

            if field.start_byte <= origin || field.end_byte > origin + region_len {
                return Err(SegyError::InvalidFieldTable(format!(
                    "field '{}' ({}..={}) lies outside the {}",
                    field.name,
                    field.start_byte,
                    field.end_byte,
                    kind.name()
                )));
            }

            if fields[..i].iter().any(|other| other.name == field.name) {
                return Err(SegyError::InvalidFieldTable(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }

        let mut by_start: Vec<&FieldDescriptor> = fields.iter().collect();
        by_start.sort_by_key(|f| f.start_byte);
        for pair in by_start.windows(2) {
            if pair[1].start_byte <= pair[0].end_byte {
                return Err(SegyError::InvalidFieldTable(format!(
                    "fields '{}' and '{}' overlap",
                    pair[0].name, pair[1].name
                )));
            }
        }

        Ok(Self {
            kind,
            fields: fields.to_vec(),
        })
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Like [`get`](Self::get) but fails with [`SegyError::UnknownField`].
    pub fn field(&self, name: &str) -> Result<&FieldDescriptor> {
        self.get(name)
            .ok_or_else(|| SegyError::UnknownField(name.to_string()))
    }

    /// Decodes `name` from a buffer holding exactly this table's header region.
    pub fn decode(&self, region: &[u8], name: &str, order: ByteOrder) -> Result<i32> {
        let field = self.field(name)?;
        decode_field(region, &field.relative_to(self.kind.origin()), order)
    }
}

impl<'a> IntoIterator for &'a FieldTable {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// The binary header table; ranges are file-absolute.
#[must_use]
pub fn binary_header_table() -> &'static FieldTable {
    &BINARY_TABLE
}

/// The trace header table; ranges are relative to the start of a trace.
#[must_use]
pub fn trace_header_table() -> &'static FieldTable {
    &TRACE_TABLE
}

static BINARY_TABLE: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(HeaderKind::Binary, BINARY_FIELDS)
        .expect("built-in binary header table is invalid - this is a bug")
});

static TRACE_TABLE: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(HeaderKind::Trace, TRACE_FIELDS)
        .expect("built-in trace header table is invalid - this is a bug")
});

const BINARY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::fixed("jn", 3201, 3204),
    FieldDescriptor::fixed("ln", 3205, 3208),
    FieldDescriptor::fixed("rn", 3209, 3212),
    FieldDescriptor::fixed("nte", 3213, 3214),
    FieldDescriptor::fixed("nate", 3215, 3216),
    FieldDescriptor::fixed("si", 3217, 3218),
    FieldDescriptor::fixed("sio", 3219, 3220),
    FieldDescriptor::fixed("ns", 3221, 3222),
    FieldDescriptor::fixed("nso", 3223, 3224),
    FieldDescriptor::fixed("dsfc", 3225, 3226),
    FieldDescriptor::fixed("cmpf", 3227, 3228),
    FieldDescriptor::fixed("tsc", 3229, 3230),
    FieldDescriptor::fixed("vsc", 3231, 3232),
    FieldDescriptor::fixed("sfs", 3233, 3234),
    FieldDescriptor::fixed("sfe", 3235, 3236),
    FieldDescriptor::fixed("sl", 3237, 3238),
    FieldDescriptor::fixed("stc", 3239, 3240),
    FieldDescriptor::fixed("tnsc", 3241, 3242),
    FieldDescriptor::fixed("sttls", 3243, 3244),
    FieldDescriptor::fixed("sttle", 3245, 3246),
    FieldDescriptor::fixed("tt", 3247, 3248),
    FieldDescriptor::fixed("cdt", 3249, 3250),
    FieldDescriptor::fixed("bgr", 3251, 3252),
    FieldDescriptor::fixed("arm", 3253, 3254),
    FieldDescriptor::fixed("ms", 3255, 3256),
    FieldDescriptor::fixed("isp", 3257, 3258),
    FieldDescriptor::fixed("vpc", 3259, 3260),
    // 3261..=3500 unassigned
    FieldDescriptor::fixed("sfrn", 3501, 3502),
    FieldDescriptor::fixed("fltf", 3503, 3504),
    FieldDescriptor::fixed("ntfhrfbh", 3505, 3506),
];

const TRACE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::fixed("tswl", 1, 4),
    FieldDescriptor::fixed("tsnwf", 5, 8),
    FieldDescriptor::fixed("ofrn", 9, 12),
    FieldDescriptor::fixed("tnwofr", 13, 16),
    FieldDescriptor::fixed("espn", 17, 20),
    FieldDescriptor::fixed("cmp", 21, 24),
    FieldDescriptor::fixed("tnwe", 25, 28),
    FieldDescriptor::fixed("tic", 29, 30),
    FieldDescriptor::fixed("nvstyt", 31, 32),
    FieldDescriptor::fixed("nhstyt", 33, 34),
    FieldDescriptor::fixed("du", 35, 36),
    FieldDescriptor::fixed("dcsptcrg", 37, 40),
    FieldDescriptor::fixed("rge", 41, 44),
    FieldDescriptor::fixed("ses", 45, 48),
    FieldDescriptor::fixed("sdbs", 49, 52),
    FieldDescriptor::fixed("derg", 53, 56),
    FieldDescriptor::fixed("des", 57, 60),
    FieldDescriptor::fixed("wds", 61, 64),
    FieldDescriptor::fixed("wdg", 65, 68),
    FieldDescriptor::fixed("saed", 69, 70),
    FieldDescriptor::fixed("sac", 71, 72),
    FieldDescriptor::fixed("scx", 73, 76),
    FieldDescriptor::fixed("scy", 77, 80),
    FieldDescriptor::fixed("gcx", 81, 84),
    FieldDescriptor::fixed("gcy", 85, 88),
    FieldDescriptor::fixed("cu", 89, 90),
    FieldDescriptor::fixed("wv", 91, 92),
    FieldDescriptor::fixed("swv", 93, 94),
    FieldDescriptor::fixed("uhts", 95, 96),
    FieldDescriptor::fixed("uhtg", 97, 98),
    FieldDescriptor::fixed("ssc", 99, 100),
    FieldDescriptor::fixed("gsc", 101, 102),
    FieldDescriptor::fixed("tsa", 103, 104),
    FieldDescriptor::fixed("lta", 105, 106),
    FieldDescriptor::fixed("ltb", 107, 108),
    FieldDescriptor::fixed("drt", 109, 110),
    FieldDescriptor::fixed("mts", 111, 112),
    FieldDescriptor::fixed("mte", 113, 114),
    FieldDescriptor::fixed("nst", 115, 116),
    FieldDescriptor::fixed("si", 117, 118),
    FieldDescriptor::fixed("gtfi", 119, 120),
    FieldDescriptor::fixed("igc", 121, 122),
    FieldDescriptor::fixed("ig", 123, 124),
    FieldDescriptor::fixed("c", 125, 126),
    FieldDescriptor::fixed("sfs", 127, 128),
    FieldDescriptor::fixed("sfe", 129, 130),
    FieldDescriptor::fixed("sl", 131, 132),
    FieldDescriptor::fixed("st", 133, 134),
    FieldDescriptor::fixed("sttls", 135, 136),
    FieldDescriptor::fixed("sttle", 137, 138),
    FieldDescriptor::fixed("tt", 139, 140),
    FieldDescriptor::fixed("aff", 141, 142),
    FieldDescriptor::fixed("afs", 143, 144),
    FieldDescriptor::fixed("nff", 145, 146),
    FieldDescriptor::fixed("nfs", 147, 148),
    FieldDescriptor::fixed("lcf", 149, 150),
    FieldDescriptor::fixed("hcf", 151, 152),
    FieldDescriptor::fixed("lcs", 153, 154),
    FieldDescriptor::fixed("hcs", 155, 156),
    FieldDescriptor::fixed("ydr", 157, 158),
    FieldDescriptor::fixed("doy", 159, 160),
    FieldDescriptor::fixed("hod", 161, 162),
    FieldDescriptor::fixed("moh", 163, 164),
    FieldDescriptor::fixed("som", 165, 166),
    FieldDescriptor::fixed("tbc", 167, 168),
    FieldDescriptor::fixed("twf", 169, 170),
    FieldDescriptor::fixed("ggnorspo", 171, 172),
    FieldDescriptor::fixed("ggnotnowofr", 173, 174),
    FieldDescriptor::fixed("ggnoltwofr", 175, 176),
    FieldDescriptor::fixed("gs", 177, 178),
    FieldDescriptor::fixed("otawtabel", 179, 180),
    FieldDescriptor::fixed("xcdp", 181, 184),
    FieldDescriptor::fixed("ycdp", 185, 188),
    FieldDescriptor::fixed("iln", 189, 192),
    FieldDescriptor::fixed("xln", 193, 196),
    FieldDescriptor::fixed("spn", 197, 200),
    FieldDescriptor::fixed("saspn", 201, 202),
    FieldDescriptor::fixed("tvmu", 203, 204),
    FieldDescriptor::fixed("tcm", 205, 208),
    FieldDescriptor::fixed("tcpte", 209, 210),
    FieldDescriptor::fixed("tu", 211, 212),
    FieldDescriptor::fixed("di", 213, 214),
    FieldDescriptor::fixed("satt", 215, 216),
    FieldDescriptor::fixed("sto", 217, 218),
    // 219..=230 hold two 6-byte values, not representable as 2/4-byte fields
    FieldDescriptor::fixed("smu", 231, 232),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_valid() {
        assert_eq!(binary_header_table().len(), 30);
        assert_eq!(trace_header_table().len(), 85);
        assert_eq!(binary_header_table().kind(), HeaderKind::Binary);
        assert_eq!(trace_header_table().kind(), HeaderKind::Trace);
    }

    #[test]
    fn well_known_fields_present() {
        for name in [JOB_ID, LINE_NUMBER, SAMPLE_FORMAT] {
            assert!(binary_header_table().get(name).is_some(), "{name}");
        }
        for name in [TRACE_SEQUENCE_IN_LINE, CMP, SOURCE_X, SOURCE_Y, TRACE_SAMPLES] {
            assert!(trace_header_table().get(name).is_some(), "{name}");
        }
        let samples = trace_header_table().field(TRACE_SAMPLES).unwrap();
        assert_eq!((samples.start_byte, samples.end_byte), (115, 116));
    }

    #[test]
    fn table_order_is_insertion_order() {
        let names: Vec<_> = trace_header_table().iter().take(3).map(|f| f.name).collect();
        assert_eq!(names, vec!["tswl", "tsnwf", "ofrn"]);
    }

    #[test]
    fn decode_big_endian() {
        let buffer = [0x00, 0x00, 0x01, 0x02, 0xFF, 0xFE];
        let word = FieldDescriptor::new("w", 1, 4).unwrap();
        let half = FieldDescriptor::new("h", 5, 6).unwrap();
        assert_eq!(decode_field(&buffer, &word, ByteOrder::Big).unwrap(), 0x0102);
        assert_eq!(decode_field(&buffer, &half, ByteOrder::Big).unwrap(), -2);
    }

    #[test]
    fn decode_native_order() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&(-123_456i32).to_ne_bytes());
        buffer.extend_from_slice(&(-7i16).to_ne_bytes());
        let word = FieldDescriptor::new("w", 1, 4).unwrap();
        let half = FieldDescriptor::new("h", 5, 6).unwrap();
        assert_eq!(decode_field(&buffer, &word, ByteOrder::Native).unwrap(), -123_456);
        assert_eq!(decode_field(&buffer, &half, ByteOrder::Native).unwrap(), -7);
    }

    #[test]
    fn decode_past_buffer_is_out_of_range() {
        let field = FieldDescriptor::new("w", 3, 6).unwrap();
        let err = decode_field(&[0u8; 5], &field, ByteOrder::Big).unwrap_err();
        assert!(matches!(err, SegyError::OutOfRange { offset: 2, len: 4, max: 5 }));
    }

    #[test]
    fn bad_width_rejected_at_construction() {
        let err = FieldDescriptor::new("odd", 1, 3).unwrap_err();
        assert!(matches!(err, SegyError::InvalidFieldWidth { name: "odd", width: 3 }));

        let err = FieldTable::new(HeaderKind::Trace, &[FieldDescriptor::fixed("wide", 219, 224)])
            .unwrap_err();
        assert!(matches!(err, SegyError::InvalidFieldWidth { width: 6, .. }));
    }

    #[test]
    fn overlapping_fields_rejected() {
        let fields = [
            FieldDescriptor::fixed("a", 1, 4),
            FieldDescriptor::fixed("b", 3, 4),
        ];
        let err = FieldTable::new(HeaderKind::Trace, &fields).unwrap_err();
        assert!(matches!(err, SegyError::InvalidFieldTable(_)));
    }

    #[test]
    fn duplicate_names_rejected() {
        let fields = [
            FieldDescriptor::fixed("a", 1, 4),
            FieldDescriptor::fixed("a", 5, 8),
        ];
        assert!(FieldTable::new(HeaderKind::Trace, &fields).is_err());
    }

    #[test]
    fn fields_outside_region_rejected() {
        let binary_in_text = [FieldDescriptor::fixed("x", 3199, 3200)];
        assert!(FieldTable::new(HeaderKind::Binary, &binary_in_text).is_err());

        let past_trace_header = [FieldDescriptor::fixed("x", 239, 242)];
        assert!(FieldTable::new(HeaderKind::Trace, &past_trace_header).is_err());
    }

    #[test]
    fn binary_table_decodes_rebased_region() {
        let mut region = vec![0u8; BINARY_HEADER_LEN as usize];
        // dsfc lives at 3225..=3226, i.e. region bytes 24..26
        region[24..26].copy_from_slice(&5i16.to_be_bytes());
        let code = binary_header_table()
            .decode(&region, SAMPLE_FORMAT, ByteOrder::Big)
            .unwrap();
        assert_eq!(code, 5);
    }

    #[test]
    fn unknown_field_name() {
        let err = trace_header_table().field("nope").unwrap_err();
        assert!(matches!(err, SegyError::UnknownField(ref n) if n == "nope"));
    }
}
