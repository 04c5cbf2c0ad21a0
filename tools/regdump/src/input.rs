//! Parsing of hex payloads and CSV sample exports

use std::io::Read;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use regcodec::RawSample;
use serde::Deserialize;
use tracing::warn;

/// Parse a hex payload
///
/// Accepts `4218E400`, `0x4218E400`, `42 18 e4 00`, `42:18:E4:00` and
/// `0x4218,0xE400`.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: String = input
        .split(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | ',' | '_'))
        .map(|piece| {
            piece
                .strip_prefix("0x")
                .or_else(|| piece.strip_prefix("0X"))
                .unwrap_or(piece)
        })
        .collect();

    if digits.is_empty() {
        bail!("empty hex input");
    }
    hex::decode(&digits).with_context(|| format!("invalid hex payload '{}'", input))
}

/// Parse a sample timestamp: RFC 3339 or Unix seconds
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<i64>() {
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| anyhow!("timestamp out of range: {}", secs));
    }
    DateTime::parse_from_rfc3339(input)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp '{}'", input))
}

#[derive(Debug, Deserialize)]
struct SampleRow {
    id: i64,
    metric_id: i64,
    value: String,
    timestamp: String,
}

impl SampleRow {
    fn into_sample(self) -> Result<RawSample> {
        Ok(RawSample {
            id: self.id,
            metric_id: self.metric_id,
            value: parse_hex(&self.value)?,
            timestamp: parse_timestamp(&self.timestamp)?,
        })
    }
}

/// Samples read from a CSV export plus the number of unreadable rows
#[derive(Debug, Default)]
pub struct SampleBatch {
    pub samples: Vec<RawSample>,
    pub skipped_rows: usize,
}

/// Columns a sample export must carry, in any order
const SAMPLE_COLUMNS: [&str; 4] = ["id", "metric_id", "value", "timestamp"];

/// Read `id,metric_id,value,timestamp` rows
///
/// A missing or incomplete header fails the whole file; unreadable rows are
/// logged and skipped.
pub fn read_samples<R: Read>(reader: R) -> Result<SampleBatch> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().context("Failed to read CSV header")?;
    let missing: Vec<&str> = SAMPLE_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        bail!("CSV header is missing columns: {}", missing.join(", "));
    }

    let mut batch = SampleBatch::default();

    for (index, row) in csv_reader.deserialize::<SampleRow>().enumerate() {
        // Header is line 1
        let line = index + 2;
        match row.map_err(anyhow::Error::from).and_then(SampleRow::into_sample) {
            Ok(sample) => batch.samples.push(sample),
            Err(e) => {
                warn!("Skipping CSV line {}: {:#}", line, e);
                batch.skipped_rows += 1;
            },
        }
    }

    Ok(batch)
}
