//! regdump - register payload decoding tool
//!
//! Decodes raw register payloads given a data format and byte order, encodes
//! values back into register bytes, validates metric definition files and
//! turns CSV sample exports into per-device JSON series.

mod commands;
mod input;
mod settings;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use regcodec::{OrderPolicy, SeriesFilter};

use crate::commands::SeriesOptions;
use crate::settings::ToolConfig;

#[derive(Parser)]
#[command(name = "regdump")]
#[command(about = "Decode register payloads by data format and byte order")]
#[command(long_about = "Decode register payloads by data format and byte order

Formats: int16, uint16, int32, uint32, float32, float64
Orders:  AB, BA, ABCD, BADC, CDAB, DCBA, ABCDEFGH, BADCFEHG, GHEFCDAB, HGFEDCBA

Examples:
  regdump decode -f float32 -o ABCD 4218E400
  regdump encode -f uint32 -o CDAB 3825222168
  regdump check --metrics metrics.yaml
  regdump series --metrics metrics.yaml --samples samples.csv --pretty
  regdump series -m metrics.yaml -s samples.csv --devices 1,2 --from 2024-05-01T00:00:00Z")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Resolve unrecognized byte orders to little-endian instead of failing
    #[arg(long, global = true)]
    legacy_order: bool,

    /// Settings file (YAML, TOML or JSON)
    #[arg(short, long, global = true, env = "REGDUMP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode hex payloads
    Decode {
        /// Data format (int16, uint16, int32, uint32, float32, float64)
        #[arg(short, long)]
        format: String,

        /// Byte order token (e.g. ABCD, CDAB)
        #[arg(short, long)]
        order: String,

        /// Hex payloads, one value each
        #[arg(required = true)]
        payloads: Vec<String>,
    },

    /// Encode a value into register bytes
    Encode {
        #[arg(short, long)]
        format: String,

        #[arg(short, long)]
        order: String,

        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Validate a metric definition file
    Check {
        #[arg(short, long)]
        metrics: PathBuf,
    },

    /// Decode a CSV sample export (id,metric_id,value,timestamp) into JSON series
    Series {
        #[arg(short, long)]
        metrics: PathBuf,

        #[arg(short, long)]
        samples: PathBuf,

        /// Only decode metrics of these devices (comma separated ids)
        #[arg(long, value_delimiter = ',')]
        devices: Vec<i64>,

        /// Only decode these metrics (comma separated ids)
        #[arg(long, value_delimiter = ',')]
        metric_ids: Vec<i64>,

        /// Keep samples strictly after this time (RFC 3339 or Unix seconds)
        #[arg(long, value_parser = input::parse_timestamp)]
        from: Option<DateTime<Utc>>,

        /// Keep samples strictly before this time (RFC 3339 or Unix seconds)
        #[arg(long, value_parser = input::parse_timestamp)]
        to: Option<DateTime<Utc>>,

        /// Keep samples in file order instead of sorting by timestamp
        #[arg(long)]
        keep_order: bool,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ToolConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.log_level = "debug".to_string();
    }
    if cli.legacy_order {
        config.order_policy = OrderPolicy::LegacyFallback;
    }
    common::logging::init(&config.log_config())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Decode {
            format,
            order,
            payloads,
        } => {
            let failures =
                commands::decode(&mut out, &format, &order, config.order_policy, &payloads)?;
            out.flush()?;
            if failures > 0 {
                bail!("{} of {} payloads failed to decode", failures, payloads.len());
            }
        },
        Commands::Encode {
            format,
            order,
            value,
        } => commands::encode(&mut out, &format, &order, config.order_policy, value)?,
        Commands::Check { metrics } => {
            let failures = commands::check(&mut out, &metrics, config.order_policy)?;
            out.flush()?;
            if failures > 0 {
                bail!("{} metric definitions are invalid", failures);
            }
        },
        Commands::Series {
            metrics,
            samples,
            devices,
            metric_ids,
            from,
            to,
            keep_order,
            pretty,
        } => commands::series(
            &mut out,
            &SeriesOptions {
                metrics_path: &metrics,
                samples_path: &samples,
                filter: SeriesFilter {
                    device_ids: devices,
                    metric_ids,
                    from,
                    to,
                },
                policy: config.order_policy,
                sort_by_time: config.sort_by_time && !keep_order,
                pretty,
            },
        )?,
    }

    Ok(())
}
