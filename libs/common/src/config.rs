//! Configuration loading
//!
//! Files are read through figment with the provider picked by extension.
//! Layered settings merge defaults, an optional file and prefixed environment
//! variables, in that order of increasing priority.

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Figment with the file provider matching the path's extension
fn file_figment(path: &Path) -> Result<Figment> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Config("Config file must have an extension".to_string()))?;

    match extension {
        "toml" => Ok(Figment::new().merge(Toml::file(path))),
        "yaml" | "yml" => Ok(Figment::new().merge(Yaml::file(path))),
        "json" => Ok(Figment::new().merge(Json::file(path))),
        _ => Err(Error::Config(format!(
            "Unsupported config file format: {}",
            extension
        ))),
    }
}

/// Load configuration from a specific file
pub fn load_config_from_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    file_figment(path)?.extract().map_err(|e| {
        Error::Config(format!(
            "Failed to load configuration from {}: {}",
            path.display(),
            e
        ))
    })
}

/// Load layered configuration
///
/// Priority (highest to lowest):
/// 1. Environment variables with `env_prefix` (e.g. `REGDUMP_LOG_LEVEL`)
/// 2. The config file, if given
/// 3. `T::default()`
pub fn load_layered<T>(file: Option<&Path>, env_prefix: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Serialize + Default,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));
    if let Some(path) = file {
        figment = figment.merge(file_figment(path)?);
    }
    figment
        .merge(Env::prefixed(env_prefix))
        .extract()
        .map_err(|e| Error::Config(format!("Failed to load configuration: {}", e)))
}
