//! Sample pipeline
//!
//! Turns metric definitions and raw stored samples into decoded time series
//! grouped by device. A metric with a bad format/order is reported as a
//! configuration failure and left out; a sample that fails to decode is
//! skipped and counted. Neither stops the batch. A [`SeriesFilter`] narrows
//! the batch to selected devices or metrics and an exclusive time window.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::decoder::{Decoder, DecoderCache, OrderPolicy};
use crate::error::DecodeError;

/// Metric definition as stored in the register map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: i64,
    pub device_id: i64,
    #[serde(default)]
    pub device_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Format token, validated when the decoder is built
    pub data_format: String,
    /// Order token, validated when the decoder is built
    pub byte_order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slave_id: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_code: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_start: Option<u16>,
    /// Polling interval in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u32>,
}

/// Raw sample as stored by the acquisition side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub id: i64,
    pub metric_id: i64,
    pub value: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

/// One decoded observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Decoded series of one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub metric: MetricDefinition,
    pub points: Vec<DataPoint>,
}

/// All decoded series of one device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSeries {
    pub device_id: i64,
    pub device_name: String,
    pub metrics: Vec<MetricSeries>,
}

fn serialize_display<S: Serializer>(err: &DecodeError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Metric whose decoder could not be built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricConfigError {
    pub metric_id: i64,
    pub metric_name: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: DecodeError,
}

/// Per-batch decode counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub accepted: usize,
    pub rejected: usize,
    /// Samples whose metric id has no definition
    pub unknown_metric: usize,
    /// Samples whose metric is defined but has no usable decoder
    pub misconfigured: usize,
    /// Samples outside the selected metrics or time window
    pub filtered: usize,
}

/// Result of pushing one sample
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Accepted(f64),
    Rejected(DecodeError),
    UnknownMetric,
    MisconfiguredMetric,
    Filtered,
}

/// Selection of metrics and time window for a batch
///
/// Empty id lists select everything. When both lists are set a metric must
/// match both. Window bounds are exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesFilter {
    pub device_ids: Vec<i64>,
    pub metric_ids: Vec<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl SeriesFilter {
    pub fn selects(&self, metric: &MetricDefinition) -> bool {
        (self.device_ids.is_empty() || self.device_ids.contains(&metric.device_id))
            && (self.metric_ids.is_empty() || self.metric_ids.contains(&metric.id))
    }

    /// Check a timestamp against the window, both bounds excluded
    pub fn in_window(&self, timestamp: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| timestamp > from) && self.to.map_or(true, |to| timestamp < to)
    }
}

/// Output of a [`SeriesBuilder`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesReport {
    pub devices: Vec<DeviceSeries>,
    pub config_errors: Vec<MetricConfigError>,
    pub stats: DecodeStats,
}

impl SeriesReport {
    pub fn has_config_errors(&self) -> bool {
        !self.config_errors.is_empty()
    }

    /// Find the series of a metric
    pub fn metric(&self, metric_id: i64) -> Option<&MetricSeries> {
        self.devices
            .iter()
            .flat_map(|device| device.metrics.iter())
            .find(|series| series.metric.id == metric_id)
    }
}

#[derive(Debug)]
struct MetricEntry {
    definition: MetricDefinition,
    decoder: Decoder,
    points: Vec<DataPoint>,
}

/// Accumulates decoded samples per metric
#[derive(Debug)]
pub struct SeriesBuilder {
    entries: BTreeMap<i64, MetricEntry>,
    misconfigured: BTreeSet<i64>,
    deselected: BTreeSet<i64>,
    config_errors: Vec<MetricConfigError>,
    filter: SeriesFilter,
    stats: DecodeStats,
    sort_by_time: bool,
}

impl SeriesBuilder {
    /// Build decoders for every metric definition
    pub fn new(metrics: impl IntoIterator<Item = MetricDefinition>, policy: OrderPolicy) -> Self {
        Self::with_filter(metrics, policy, SeriesFilter::default())
    }

    /// Build decoders for the metrics selected by `filter`
    ///
    /// The first definition of an id wins, valid or not; later duplicates are
    /// dropped before validation. Definitions sharing a `(format, order)` pair
    /// share one decoder. Unselected metrics are not validated.
    pub fn with_filter(
        metrics: impl IntoIterator<Item = MetricDefinition>,
        policy: OrderPolicy,
        filter: SeriesFilter,
    ) -> Self {
        let mut definitions: BTreeMap<i64, MetricDefinition> = BTreeMap::new();
        for definition in metrics {
            match definitions.entry(definition.id) {
                Entry::Occupied(_) => {
                    warn!("Duplicate metric id {}, keeping first definition", definition.id);
                },
                Entry::Vacant(slot) => {
                    slot.insert(definition);
                },
            }
        }

        let mut cache = DecoderCache::new(policy);
        let mut entries = BTreeMap::new();
        let mut misconfigured = BTreeSet::new();
        let mut deselected = BTreeSet::new();
        let mut config_errors = Vec::new();

        for (id, definition) in definitions {
            if !filter.selects(&definition) {
                deselected.insert(id);
                continue;
            }
            match cache.get(&definition.data_format, &definition.byte_order) {
                Ok(decoder) => {
                    entries.insert(
                        id,
                        MetricEntry {
                            definition,
                            decoder,
                            points: Vec::new(),
                        },
                    );
                },
                Err(error) => {
                    warn!(
                        "Metric {} ({}) has invalid decoder configuration: {}",
                        definition.id, definition.name, error
                    );
                    misconfigured.insert(id);
                    config_errors.push(MetricConfigError {
                        metric_id: definition.id,
                        metric_name: definition.name,
                        error,
                    });
                },
            }
        }

        debug!(
            "Series builder ready: {} metrics, {} decoders, {} config errors, {} deselected",
            entries.len(),
            cache.len(),
            config_errors.len(),
            deselected.len()
        );

        Self {
            entries,
            misconfigured,
            deselected,
            config_errors,
            filter,
            stats: DecodeStats::default(),
            sort_by_time: false,
        }
    }

    /// Sort each series by timestamp when finishing
    pub fn sort_by_time(mut self, enabled: bool) -> Self {
        self.sort_by_time = enabled;
        self
    }

    /// Decoder of a configured metric
    pub fn decoder(&self, metric_id: i64) -> Option<Decoder> {
        self.entries.get(&metric_id).map(|entry| entry.decoder)
    }

    pub fn config_errors(&self) -> &[MetricConfigError] {
        &self.config_errors
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Decode one sample into its metric's series
    pub fn push(&mut self, sample: &RawSample) -> SampleOutcome {
        let Some(entry) = self.entries.get_mut(&sample.metric_id) else {
            if self.misconfigured.contains(&sample.metric_id) {
                self.stats.misconfigured += 1;
                return SampleOutcome::MisconfiguredMetric;
            }
            if self.deselected.contains(&sample.metric_id) {
                self.stats.filtered += 1;
                return SampleOutcome::Filtered;
            }
            self.stats.unknown_metric += 1;
            debug!(
                "Sample {} references unknown metric {}",
                sample.id, sample.metric_id
            );
            return SampleOutcome::UnknownMetric;
        };

        if !self.filter.in_window(sample.timestamp) {
            self.stats.filtered += 1;
            return SampleOutcome::Filtered;
        }

        match entry.decoder.decode(&sample.value) {
            Ok(value) => {
                entry.points.push(DataPoint {
                    timestamp: sample.timestamp,
                    value,
                });
                self.stats.accepted += 1;
                SampleOutcome::Accepted(value)
            },
            Err(error) => {
                self.stats.rejected += 1;
                debug!(
                    "Skipping sample {} of metric {}: {}",
                    sample.id, sample.metric_id, error
                );
                SampleOutcome::Rejected(error)
            },
        }
    }

    /// Decode a batch of samples
    pub fn extend<'a>(&mut self, samples: impl IntoIterator<Item = &'a RawSample>) {
        for sample in samples {
            self.push(sample);
        }
    }

    /// Group the decoded series by device
    pub fn finish(self) -> SeriesReport {
        let mut devices: BTreeMap<i64, DeviceSeries> = BTreeMap::new();

        for (_, entry) in self.entries {
            let mut points = entry.points;
            if self.sort_by_time {
                points.sort_by_key(|point| point.timestamp);
            }

            let device = devices
                .entry(entry.definition.device_id)
                .or_insert_with(|| DeviceSeries {
                    device_id: entry.definition.device_id,
                    device_name: entry.definition.device_name.clone(),
                    metrics: Vec::new(),
                });
            device.metrics.push(MetricSeries {
                metric: entry.definition,
                points,
            });
        }

        info!(
            "Decoded {} samples ({} rejected, {} unknown metric, {} misconfigured, {} filtered) across {} devices",
            self.stats.accepted,
            self.stats.rejected,
            self.stats.unknown_metric,
            self.stats.misconfigured,
            self.stats.filtered,
            devices.len()
        );

        SeriesReport {
            devices: devices.into_values().collect(),
            config_errors: self.config_errors,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::bytes::DataFormat;
    use chrono::TimeZone;

    fn metric(id: i64, device_id: i64, format: &str, order: &str) -> MetricDefinition {
        MetricDefinition {
            id,
            device_id,
            device_name: format!("device-{device_id}"),
            name: format!("metric-{id}"),
            unit: None,
            data_format: format.to_string(),
            byte_order: order.to_string(),
            slave_id: None,
            function_code: None,
            register_start: None,
            refresh_rate: None,
        }
    }

    fn sample(id: i64, metric_id: i64, value: &[u8], secs: i64) -> RawSample {
        RawSample {
            id,
            metric_id,
            value: value.to_vec(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_push_outcomes() {
        let mut builder = SeriesBuilder::new([metric(1, 10, "uint16", "AB")], OrderPolicy::Strict);

        assert_eq!(
            builder.push(&sample(1, 1, &[0x01, 0x00], 0)),
            SampleOutcome::Accepted(256.0)
        );
        assert_eq!(
            builder.push(&sample(2, 1, &[0x01], 1)),
            SampleOutcome::Rejected(DecodeError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            builder.push(&sample(3, 99, &[0x01, 0x00], 2)),
            SampleOutcome::UnknownMetric
        );
        assert_eq!(
            builder.stats(),
            DecodeStats {
                accepted: 1,
                rejected: 1,
                unknown_metric: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_config_errors_do_not_block_others() {
        let builder = SeriesBuilder::new(
            [
                metric(1, 10, "int24", "ABC"),
                metric(2, 10, "float32", "ABCD"),
                metric(3, 10, "int16", "ABCD"),
            ],
            OrderPolicy::Strict,
        );
        let ids: Vec<i64> = builder.config_errors().iter().map(|e| e.metric_id).collect();
        assert_eq!(ids, [1, 3]);
        assert!(builder.decoder(2).is_some());
        assert!(builder.decoder(1).is_none());
    }

    #[test]
    fn test_duplicate_metric_keeps_first() {
        let builder = SeriesBuilder::new(
            [metric(1, 10, "uint16", "AB"), metric(1, 10, "uint16", "BA")],
            OrderPolicy::Strict,
        );
        assert_eq!(builder.decoder(1).unwrap().order().as_str(), "AB");
    }

    #[test]
    fn test_finish_groups_by_device() {
        let mut builder = SeriesBuilder::new(
            [
                metric(3, 20, "int16", "AB"),
                metric(1, 10, "int16", "AB"),
                metric(2, 10, "int16", "BA"),
            ],
            OrderPolicy::Strict,
        )
        .sort_by_time(true);

        let samples = [
            sample(1, 1, &[0x00, 0x02], 20),
            sample(2, 1, &[0x00, 0x01], 10),
            sample(3, 2, &[0x05, 0x00], 10),
            sample(4, 3, &[0xFF, 0xFF], 10),
        ];
        builder.extend(&samples);
        let report = builder.finish();

        assert!(!report.has_config_errors());
        assert_eq!(report.devices.len(), 2);
        assert_eq!(report.devices[0].device_id, 10);
        assert_eq!(report.devices[0].metrics.len(), 2);
        assert_eq!(report.devices[1].device_name, "device-20");

        let values: Vec<f64> = report.metric(1).unwrap().points.iter().map(|p| p.value).collect();
        assert_eq!(values, [1.0, 2.0]);
        assert_eq!(report.metric(2).unwrap().points[0].value, 5.0);
        assert_eq!(report.metric(3).unwrap().points[0].value, -1.0);
    }

    #[test]
    fn test_arrival_order_kept_without_sorting() {
        let mut builder = SeriesBuilder::new([metric(1, 10, "int16", "AB")], OrderPolicy::Strict);
        builder.extend(&[sample(1, 1, &[0, 2], 20), sample(2, 1, &[0, 1], 10)]);
        let report = builder.finish();
        let values: Vec<f64> = report.metric(1).unwrap().points.iter().map(|p| p.value).collect();
        assert_eq!(values, [2.0, 1.0]);
    }

    #[test]
    fn test_metric_definition_from_yaml() {
        let yaml = r#"
- id: 7
  device_id: 1
  device_name: Inverter
  name: Active power
  unit: kW
  data_format: float32
  byte_order: CDAB
  slave_id: 1
  function_code: 3
  register_start: 40001
  refresh_rate: 1000
"#;
        let metrics: Vec<MetricDefinition> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(metrics[0].register_start, Some(40001));
        assert_eq!(metrics[0].unit.as_deref(), Some("kW"));
    }

    #[test]
    fn test_report_serializes_errors_as_text() {
        let report = SeriesBuilder::new([metric(1, 10, "bcd", "AB")], OrderPolicy::Strict).finish();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["config_errors"][0]["error"],
            "Unsupported data format: 'bcd'"
        );
    }

    #[test]
    fn test_misconfigured_metric_is_not_unknown() {
        let mut builder =
            SeriesBuilder::new([metric(3, 10, "float32", "BDAC")], OrderPolicy::Strict);

        assert_eq!(
            builder.push(&sample(1, 3, &[0x42, 0x48, 0x00, 0x00], 0)),
            SampleOutcome::MisconfiguredMetric
        );
        assert_eq!(
            builder.push(&sample(2, 4, &[0x00, 0x01], 0)),
            SampleOutcome::UnknownMetric
        );
        assert_eq!(
            builder.stats(),
            DecodeStats {
                unknown_metric: 1,
                misconfigured: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_invalid_first_duplicate_wins() {
        let builder = SeriesBuilder::new(
            [metric(1, 10, "int24", "AB"), metric(1, 10, "uint16", "AB")],
            OrderPolicy::Strict,
        );
        assert_eq!(builder.config_errors().len(), 1);
        assert_eq!(builder.config_errors()[0].metric_id, 1);
        assert!(builder.decoder(1).is_none());
    }

    #[test]
    fn test_invalid_later_duplicate_ignored() {
        let builder = SeriesBuilder::new(
            [metric(1, 10, "uint16", "AB"), metric(1, 10, "int24", "AB")],
            OrderPolicy::Strict,
        );
        assert!(builder.config_errors().is_empty());
        assert_eq!(builder.decoder(1).unwrap().format(), DataFormat::UInt16);
    }

    #[test]
    fn test_filter_selects_devices_and_metrics() {
        let filter = SeriesFilter {
            device_ids: vec![10],
            ..Default::default()
        };
        let mut builder = SeriesBuilder::with_filter(
            [
                metric(1, 10, "uint16", "AB"),
                metric(2, 20, "uint16", "AB"),
                metric(3, 20, "int24", "AB"),
            ],
            OrderPolicy::Strict,
            filter,
        );
        // Unselected metrics are not validated
        assert!(builder.config_errors().is_empty());
        assert!(builder.decoder(2).is_none());
        assert_eq!(builder.push(&sample(1, 2, &[0, 1], 0)), SampleOutcome::Filtered);
        assert_eq!(builder.push(&sample(2, 1, &[0, 1], 0)), SampleOutcome::Accepted(1.0));

        let filter = SeriesFilter {
            metric_ids: vec![2],
            ..Default::default()
        };
        let builder = SeriesBuilder::with_filter(
            [metric(1, 10, "uint16", "AB"), metric(2, 20, "uint16", "AB")],
            OrderPolicy::Strict,
            filter,
        );
        assert!(builder.decoder(1).is_none());
        assert!(builder.decoder(2).is_some());
    }

    #[test]
    fn test_time_window_bounds_are_exclusive() {
        let filter = SeriesFilter {
            from: Some(Utc.timestamp_opt(100, 0).unwrap()),
            to: Some(Utc.timestamp_opt(200, 0).unwrap()),
            ..Default::default()
        };
        let mut builder =
            SeriesBuilder::with_filter([metric(1, 10, "uint16", "AB")], OrderPolicy::Strict, filter);

        assert_eq!(builder.push(&sample(1, 1, &[0, 1], 100)), SampleOutcome::Filtered);
        assert_eq!(builder.push(&sample(2, 1, &[0, 2], 101)), SampleOutcome::Accepted(2.0));
        assert_eq!(builder.push(&sample(3, 1, &[0, 3], 199)), SampleOutcome::Accepted(3.0));
        assert_eq!(builder.push(&sample(4, 1, &[0, 4], 200)), SampleOutcome::Filtered);
        assert_eq!(builder.stats().filtered, 2);

        let report = builder.finish();
        assert_eq!(report.metric(1).unwrap().points.len(), 2);
    }

    #[test]
    fn test_open_window() {
        let filter = SeriesFilter {
            from: Some(Utc.timestamp_opt(100, 0).unwrap()),
            ..Default::default()
        };
        assert!(!filter.in_window(Utc.timestamp_opt(100, 0).unwrap()));
        assert!(filter.in_window(Utc.timestamp_opt(i64::from(u32::MAX), 0).unwrap()));
        assert!(SeriesFilter::default().in_window(Utc.timestamp_opt(0, 0).unwrap()));
    }
}
