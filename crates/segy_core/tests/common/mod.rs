//! Synthetic SEG-Y volumes for the integration tests.

#![allow(dead_code)]

use segy_core::ByteOrder;
use std::io::Write;
use tempfile::NamedTempFile;

pub struct TestTrace {
    pub sequence: i32,
    pub cmp: i32,
    pub x: i32,
    pub y: i32,
    pub samples: Vec<f32>,
}

impl TestTrace {
    pub fn constant(sequence: i32, value: f32, samples: usize) -> Self {
        Self {
            sequence,
            cmp: sequence,
            x: 0,
            y: 0,
            samples: vec![value; samples],
        }
    }
}

fn put_i32(buf: &mut [u8], at: usize, value: i32, order: ByteOrder) {
    let bytes = match order {
        ByteOrder::Big => value.to_be_bytes(),
        ByteOrder::Native => value.to_ne_bytes(),
    };
    buf[at..at + 4].copy_from_slice(&bytes);
}

fn put_i16(buf: &mut [u8], at: usize, value: i16, order: ByteOrder) {
    let bytes = match order {
        ByteOrder::Big => value.to_be_bytes(),
        ByteOrder::Native => value.to_ne_bytes(),
    };
    buf[at..at + 2].copy_from_slice(&bytes);
}

/// Text header whose encoding implies `order`: EBCDIC for big-endian, ASCII
/// for native.
pub fn text_header(order: ByteOrder) -> Vec<u8> {
    match order {
        ByteOrder::Big => {
            let mut raw = vec![0x40u8; 3200];
            // "C 1 TEST"
            raw[..8].copy_from_slice(&[0xC3, 0x40, 0xF1, 0x40, 0xE3, 0xC5, 0xE2, 0xE3]);
            raw
        }
        ByteOrder::Native => {
            let mut raw = vec![b' '; 3200];
            raw[..8].copy_from_slice(b"C 1 TEST");
            raw
        }
    }
}

/// Builds a volume with IEEE float samples (format 5). Header fields use
/// `order`, samples are always big-endian.
pub fn build_volume(order: ByteOrder, line_number: i32, traces: &[TestTrace]) -> Vec<u8> {
    let mut data = text_header(order);

    let mut binary = [0u8; 400];
    put_i32(&mut binary, 4, line_number, order);
    put_i16(&mut binary, 24, 5, order);
    data.extend_from_slice(&binary);

    for trace in traces {
        let mut header = [0u8; 240];
        put_i32(&mut header, 0, trace.sequence, order);
        put_i32(&mut header, 20, trace.cmp, order);
        put_i32(&mut header, 72, trace.x, order);
        put_i32(&mut header, 76, trace.y, order);
        put_i16(&mut header, 114, trace.samples.len() as i16, order);
        data.extend_from_slice(&header);
        for sample in &trace.samples {
            data.extend_from_slice(&sample.to_be_bytes());
        }
    }
    data
}

/// `inlines` × `crosslines` grid starting at CMP `first_cmp`; trace `n`
/// holds `samples` copies of `n` and sits at x = 10 * n, y = -n.
pub fn build_grid(
    line_number: i32,
    first_cmp: i32,
    inlines: i32,
    crosslines: i32,
    samples: usize,
) -> Vec<u8> {
    let traces: Vec<TestTrace> = (0..inlines * crosslines)
        .map(|i| {
            let n = i + 1;
            TestTrace {
                sequence: n,
                cmp: first_cmp + i % crosslines,
                x: 10 * n,
                y: -n,
                samples: vec![n as f32; samples],
            }
        })
        .collect();
    build_volume(ByteOrder::Big, line_number, &traces)
}

pub fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(data).unwrap();
    temp.flush().unwrap();
    temp
}
