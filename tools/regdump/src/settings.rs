//! Tool settings
//!
//! Layered as defaults, then the optional `--config` file, then `REGDUMP_*`
//! environment variables, then command-line flags.

use std::path::Path;

use anyhow::{Context, Result};
use common::LogConfig;
use regcodec::{MetricDefinition, OrderPolicy};
use serde::{Deserialize, Serialize};

/// Environment prefix for setting overrides
pub const ENV_PREFIX: &str = "REGDUMP_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub log_level: String,
    pub log_json: bool,
    pub order_policy: OrderPolicy,
    /// Sort each decoded series by timestamp
    pub sort_by_time: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_json: false,
            order_policy: OrderPolicy::Strict,
            sort_by_time: true,
        }
    }
}

impl ToolConfig {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        common::load_layered(file, ENV_PREFIX).context("Failed to load regdump settings")
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            json: self.log_json,
        }
    }
}

/// Metric definition file layout
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsFile {
    pub metrics: Vec<MetricDefinition>,
}

impl MetricsFile {
    pub fn load(path: &Path) -> Result<Vec<MetricDefinition>> {
        let file: MetricsFile = common::load_config_from_file(path)
            .with_context(|| format!("Failed to load metric definitions from {}", path.display()))?;
        Ok(file.metrics)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regdump.toml");
        std::fs::write(&path, "order_policy = \"legacy_fallback\"\nsort_by_time = false\n").unwrap();

        let config = ToolConfig::load(Some(&path)).unwrap();
        assert_eq!(config.order_policy, OrderPolicy::LegacyFallback);
        assert!(!config.sort_by_time);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_metrics_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.yaml");
        std::fs::write(
            &path,
            "metrics:\n  - id: 1\n    device_id: 2\n    name: Power\n    data_format: float32\n    byte_order: CDAB\n",
        )
        .unwrap();

        let metrics = MetricsFile::load(&path).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].byte_order, "CDAB");
        assert_eq!(metrics[0].device_name, "");
    }

    #[test]
    fn test_example_settings_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/regdump.example.toml");
        let config = ToolConfig::load(Some(&path)).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.order_policy, OrderPolicy::Strict);
        assert!(config.sort_by_time);
        assert_eq!(config.log_config().level, "info");
    }
}
