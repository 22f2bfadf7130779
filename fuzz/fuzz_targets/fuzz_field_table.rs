#![no_main]

use libfuzzer_sys::fuzz_target;
use segy_core::ByteOrder;
use segy_core::headers::{parse_binary_header, parse_trace_header};
use segy_core::text_header::TextHeader;

fuzz_target!(|data: &[u8]| {
    let _ = TextHeader::decode(data);
    for order in [ByteOrder::Big, ByteOrder::Native] {
        let _ = parse_binary_header(data, order);
        let _ = parse_trace_header(data, order);
    }
});
