//! Configuration module
//!
//! Provides types and loading for `tilekit.toml` editor defaults.

pub mod loader;
pub mod schema;

pub use loader::{find_config, load_config, merge_cli_overrides, CliOverrides, ConfigError, CONFIG_FILE};
pub use schema::*;
