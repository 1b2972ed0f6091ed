//! Configuration loading and discovery for `tilekit.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::TilekitConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "tilekit.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse tilekit.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub output_size: Option<u32>,
    pub tile_size: Option<u32>,
    pub rotation: Option<f32>,
    pub flip_x: Option<bool>,
    pub flip_y: Option<bool>,
    pub split: Option<bool>,
    pub spacing: Option<u32>,
    pub map_name: Option<String>,
}

/// Find tilekit.toml by walking up from the current working directory,
/// falling back to `$XDG_CONFIG_HOME/tilekit/tilekit.toml`.
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find tilekit.toml in the XDG config directory.
///
/// Checks XDG_CONFIG_HOME/tilekit/tilekit.toml or ~/.config/tilekit/tilekit.toml
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("tilekit").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find tilekit.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a tilekit.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the
/// defaults.
pub fn load_config(path: Option<&Path>) -> Result<TilekitConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(TilekitConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<TilekitConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: TilekitConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. Tile size and
/// spacing apply to every section that has them.
pub fn merge_cli_overrides(config: &mut TilekitConfig, overrides: &CliOverrides) {
    if let Some(size) = overrides.output_size {
        config.process.output_size = Some(size);
    }

    if let Some(tile_size) = overrides.tile_size {
        config.process.tile_size = tile_size;
        config.import.tile_size = tile_size;
        config.tilemap.tile_size = tile_size;
    }

    if let Some(rotation) = overrides.rotation {
        config.process.rotation = rotation;
    }
    if let Some(flip_x) = overrides.flip_x {
        config.process.flip_x = flip_x;
    }
    if let Some(flip_y) = overrides.flip_y {
        config.process.flip_y = flip_y;
    }
    if let Some(split) = overrides.split {
        config.process.split = split;
    }

    if let Some(spacing) = overrides.spacing {
        config.import.spacing = spacing;
        config.tilemap.spacing = spacing;
    }

    if let Some(ref name) = overrides.map_name {
        config.tilemap.name = name.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &[u8]) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents)
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[import]\nspacing = 0");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"");

        let subdir = temp.path().join("art").join("tiles");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br#"
[import]
tile_size = 16
spacing = 1

[tilemap]
name = "overworld"
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.import.tile_size, 16);
        assert_eq!(config.import.spacing, 1);
        assert_eq!(config.tilemap.name, "overworld");
        assert_eq!(config.tilemap.width, 32);
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"this is not valid toml {{{");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br#"
[tilemap]
name = ""
tile_size = 0
"#,
        );

        match load_config(Some(&config_path)) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().any(|e| e.contains("tilemap.tile_size")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides_tile_size_everywhere() {
        let mut config = TilekitConfig::default();
        let overrides = CliOverrides { tile_size: Some(16), ..Default::default() };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.process.tile_size, 16);
        assert_eq!(config.import.tile_size, 16);
        assert_eq!(config.tilemap.tile_size, 16);
    }

    #[test]
    fn test_merge_cli_overrides_multiple() {
        let mut config = TilekitConfig::default();
        let overrides = CliOverrides {
            output_size: Some(64),
            rotation: Some(180.0),
            flip_x: Some(true),
            split: Some(true),
            spacing: Some(0),
            map_name: Some("town".to_string()),
            ..Default::default()
        };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.process.output_size, Some(64));
        assert_eq!(config.process.rotation, 180.0);
        assert!(config.process.flip_x);
        assert!(!config.process.flip_y);
        assert!(config.process.split);
        assert_eq!(config.import.spacing, 0);
        assert_eq!(config.tilemap.name, "town");
    }

    #[test]
    fn test_merge_cli_overrides_none_keeps_config() {
        let mut config = TilekitConfig::default();
        config.import.spacing = 4;
        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config.import.spacing, 4);
    }
}
