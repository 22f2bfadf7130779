use anyhow::{Context, Result};
use humansize::{BINARY, format_size};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use segy_core::{
    AmplitudeRange, BlockSource, ByteOrder, GeometryInfo, ScanOptions, Section, SegyFile,
    TextEncoding,
};

use crate::Command;

#[derive(Debug, Serialize)]
struct FileSummary {
    path: Option<String>,
    size: u64,
    encoding: TextEncoding,
    byte_order: ByteOrder,
    sample_format_code: i32,
    sample_format: Option<&'static str>,
    samples_per_trace: usize,
    bytes_per_trace: u64,
    num_traces: u64,
}

#[derive(Debug, Serialize)]
struct ScanReport<'a> {
    geometry: &'a GeometryInfo,
    amplitude: AmplitudeRange,
}

pub fn run<S: BlockSource>(
    file: &SegyFile<S>,
    command: &Command,
    scan: &ScanOptions,
    json: bool,
) -> Result<()> {
    match command {
        Command::Text => {
            let header = file.text_header().context("Failed to read text header")?;
            if json {
                return print_json(header);
            }
            for line in header.lines() {
                println!("{line}");
            }
        }
        Command::Binary => {
            let header = file.binary_header().context("Failed to read binary header")?;
            if json {
                return print_json(header);
            }
            for (name, value) in header.iter() {
                println!("{name:<10} {value}");
            }
        }
        Command::Info => {
            let summary = summarize(file)?;
            if json {
                return print_json(&summary);
            }
            print_summary(&summary);
        }
        Command::Headers { traces } => {
            let table = file
                .trace_headers(traces)
                .context("Failed to read trace headers")?;
            if json {
                return print_json(&table);
            }
            print!("{:<10}", "field");
            for trace in table.trace_numbers() {
                print!(" {trace:>12}");
            }
            println!();
            println!("{}", "-".repeat(10 + 13 * table.num_columns()));
            for (name, cells) in table.rows() {
                print!("{name:<10}");
                for (_, value) in cells {
                    print!(" {value:>12}");
                }
                println!();
            }
        }
        Command::Scan => {
            let spinner = spinner("Scanning trace headers...");
            let geometry = file.scan_header_extrema(scan);
            spinner.set_message("Scanning samples...");
            let amplitude = file.scan_amplitude_extrema(scan);
            spinner.finish_and_clear();

            let report = ScanReport {
                geometry: geometry.context("Header scan failed")?,
                amplitude: amplitude.context("Amplitude scan failed")?,
            };
            if json {
                return print_json(&report);
            }
            print_scan(&report);
        }
        Command::Trace { trace } => {
            let samples = file
                .read_trace(*trace)
                .with_context(|| format!("Failed to read trace {trace}"))?;
            if json {
                return print_json(&samples);
            }
            for (i, value) in samples.iter().enumerate() {
                println!("{i:>6} {value}");
            }
        }
        Command::Inline { inline } => {
            let section = file
                .traces_for_inline(*inline)
                .with_context(|| format!("Failed to read inline {inline}"))?;
            print_section(&section, json)?;
        }
        Command::Crossline { crossline } => {
            let section = file
                .traces_for_crossline(*crossline)
                .with_context(|| format!("Failed to read crossline {crossline}"))?;
            print_section(&section, json)?;
        }
    }
    Ok(())
}

fn summarize<S: BlockSource>(file: &SegyFile<S>) -> Result<FileSummary> {
    let encoding = file.text_header().context("Failed to read text header")?.encoding();
    let info = *file.trace_info().context("Failed to derive trace layout")?;
    let num_traces = file.num_traces().context("Failed to count traces")?;

    Ok(FileSummary {
        path: file.path().map(|p| p.display().to_string()),
        size: file.size(),
        encoding,
        byte_order: file.byte_order()?,
        sample_format_code: info.sample_format_code,
        sample_format: info.sample_format().ok().map(|f| f.name()),
        samples_per_trace: info.samples_per_trace,
        bytes_per_trace: info.bytes_per_trace,
        num_traces,
    })
}

fn print_summary(summary: &FileSummary) {
    if let Some(path) = &summary.path {
        println!("File:              {path}");
    }
    println!("Size:              {}", format_size(summary.size, BINARY));
    println!("Text encoding:     {}", summary.encoding);
    println!("Header byte order: {}", summary.byte_order);
    println!(
        "Sample format:     {} ({})",
        summary.sample_format_code,
        summary.sample_format.unwrap_or("unknown")
    );
    println!("Samples per trace: {}", summary.samples_per_trace);
    println!("Bytes per trace:   {}", summary.bytes_per_trace);
    println!("Traces:            {}", summary.num_traces);
}

fn print_scan(report: &ScanReport<'_>) {
    let g = report.geometry;
    println!("Traces:     {}", g.num_traces);
    println!("X:          {} .. {}", g.min_x, g.max_x);
    println!("Y:          {} .. {}", g.min_y, g.max_y);
    println!("CMP:        {} .. {}", g.min_cmp, g.max_cmp);
    println!(
        "Inlines:    {} .. {} ({} lines, end exclusive)",
        g.min_inline, g.max_inline, g.num_inlines
    );
    println!(
        "Crosslines: {} .. {} ({} lines)",
        g.min_crossline, g.max_crossline, g.num_crosslines
    );
    if !g.is_rectangular() {
        println!("Grid:       not rectangular, trailing traces are off the grid");
    }
    if report.amplitude.is_empty() {
        println!("Amplitude:  no comparable samples");
    } else {
        println!(
            "Amplitude:  {} .. {}",
            report.amplitude.min, report.amplitude.max
        );
    }
}

/// Samples down, traces across.
fn print_section(section: &Section, json: bool) -> Result<()> {
    if json {
        return print_json(section);
    }
    let columns = section.num_traces();
    if columns == 0 {
        return Ok(());
    }
    for row in section.to_row_major().chunks(columns) {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", line.join("\t"));
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed_precise}]")
            .expect("invalid spinner template - this is a bug"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
