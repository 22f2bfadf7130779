#![no_main]

use libfuzzer_sys::fuzz_target;
use segy_core::{OpenOptions, ScanOptions, SegyFile};

fuzz_target!(|data: &[u8]| {
    let file = SegyFile::from_source(data.to_vec(), OpenOptions::default());
    let _ = file.binary_header();

    let Ok(num_traces) = file.num_traces() else {
        return;
    };
    if num_traces > 4096 {
        return;
    }

    let _ = file.trace_headers(&[1, num_traces]);
    let _ = file.read_trace(num_traces);

    let options = ScanOptions::new().sequential();
    let _ = file.scan_amplitude_extrema(&options);
    if let Ok(geometry) = file.scan_header_extrema(&options) {
        let _ = file.traces_for_inline(geometry.min_inline);
        let _ = file.traces_for_crossline(geometry.min_crossline);
    }
});
