//! Subcommand implementations
//!
//! Each command writes its results to the given writer and returns the number
//! of failed items, so a bad input is reported without stopping the batch.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use regcodec::{make_decoder_with_policy, DataFormat, OrderPolicy, SeriesBuilder, SeriesFilter};
use tracing::info;

use crate::input::{parse_hex, read_samples};
use crate::settings::MetricsFile;

/// Render a decoded value, integers without a fractional part
pub fn format_value(format: DataFormat, value: f64) -> String {
    if format.is_float() {
        format!("{value:?}")
    } else {
        format!("{}", value as i64)
    }
}

/// Decode hex payloads, one output line per input
pub fn decode<W: Write>(
    out: &mut W,
    format: &str,
    order: &str,
    policy: OrderPolicy,
    inputs: &[String],
) -> Result<usize> {
    let decoder = make_decoder_with_policy(format, order, policy)
        .with_context(|| format!("Invalid decoder configuration {}/{}", format, order))?;

    let mut failures = 0;
    for input in inputs {
        let result = parse_hex(input)
            .and_then(|bytes| decoder.decode(&bytes).map_err(anyhow::Error::from));
        match result {
            Ok(value) => writeln!(out, "{}", format_value(decoder.format(), value))?,
            Err(e) => {
                failures += 1;
                writeln!(out, "error: {}: {:#}", input, e)?;
            },
        }
    }
    Ok(failures)
}

/// Encode a value, printing wire bytes and register words
pub fn encode<W: Write>(
    out: &mut W,
    format: &str,
    order: &str,
    policy: OrderPolicy,
    value: f64,
) -> Result<()> {
    let decoder = make_decoder_with_policy(format, order, policy)
        .with_context(|| format!("Invalid decoder configuration {}/{}", format, order))?;
    let bytes = decoder.encode(value)?;
    let registers = regcodec::bytes::bytes_to_registers(&bytes)?;

    writeln!(out, "bytes:     {}", hex::encode_upper(&bytes))?;
    let words: Vec<String> = registers.iter().map(|r| format!("0x{:04X}", r)).collect();
    writeln!(out, "registers: {}", words.join(" "))?;
    Ok(())
}

/// Validate metric definitions, returning the number of invalid ones
pub fn check<W: Write>(out: &mut W, metrics_path: &Path, policy: OrderPolicy) -> Result<usize> {
    let metrics = MetricsFile::load(metrics_path)?;
    let total = metrics.len();
    let builder = SeriesBuilder::new(metrics, policy);

    for error in builder.config_errors() {
        writeln!(
            out,
            "metric {} ({}): {}",
            error.metric_id, error.metric_name, error.error
        )?;
    }
    let failures = builder.config_errors().len();
    writeln!(out, "{} of {} metric definitions valid", total - failures, total)?;
    Ok(failures)
}

/// Options of the `series` command
pub struct SeriesOptions<'a> {
    pub metrics_path: &'a Path,
    pub samples_path: &'a Path,
    pub filter: SeriesFilter,
    pub policy: OrderPolicy,
    pub sort_by_time: bool,
    pub pretty: bool,
}

/// Decode a CSV sample export into per-device series as JSON
pub fn series<W: Write>(out: &mut W, options: &SeriesOptions<'_>) -> Result<()> {
    let metrics = MetricsFile::load(options.metrics_path)?;
    let file = File::open(options.samples_path)
        .with_context(|| format!("Failed to open {}", options.samples_path.display()))?;
    let batch = read_samples(BufReader::new(file))?;
    info!(
        "Read {} samples ({} unreadable rows) from {}",
        batch.samples.len(),
        batch.skipped_rows,
        options.samples_path.display()
    );

    let mut builder =
        SeriesBuilder::with_filter(metrics, options.policy, options.filter.clone())
            .sort_by_time(options.sort_by_time);
    builder.extend(&batch.samples);
    let report = builder.finish();

    if options.pretty {
        serde_json::to_writer_pretty(&mut *out, &report)?;
    } else {
        serde_json::to_writer(&mut *out, &report)?;
    }
    writeln!(out)?;
    Ok(())
}
