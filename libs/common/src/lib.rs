//! Shared support library for the register decoder tools
//!
//! Provides:
//! - logging bootstrap (bracketed text or JSON, `RUST_LOG` aware)
//! - configuration loading (YAML/TOML/JSON files, prefixed env overrides)

pub mod config;
pub mod error;
pub mod logging;

pub use config::{load_config_from_file, load_layered};
pub use error::{Error, Result};
pub use logging::LogConfig;
