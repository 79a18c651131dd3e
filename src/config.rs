//! User configuration (`config.toml`).
//!
//! Problems with the file never stop the program; they come back as warnings
//! and the defaults are used.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use gridcalc_core::document::{DEFAULT_COLS, DEFAULT_ROWS};
use serde::Deserialize;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub grid: GridConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "warn".to_string(),
        }
    }
}

/// Load the config from `explicit`, or the platform config dir when `None`.
/// A missing default file is silent; a missing explicit one is a warning.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = explicit.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let config = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => match parse_config(&content) {
                Ok(config) => Some(config),
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            None
        }
    };

    let mut config = config.unwrap_or_default();
    if config.grid.rows == 0 || config.grid.cols == 0 {
        warnings.push(format!(
            "Ignoring empty grid size {}x{} in {}",
            config.grid.rows,
            config.grid.cols,
            path.display()
        ));
        config.grid = GridConfig::default();
    }
    (config, warnings)
}

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.grid.rows, 100);
        assert_eq!(config.grid.cols, 26);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config("[grid]\ncols = 8\n").unwrap();
        assert_eq!(config.grid.rows, 100);
        assert_eq!(config.grid.cols, 8);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(parse_config("[grid]\nwidth = 8\n").is_err());
        assert!(parse_config("[theme]\n").is_err());
    }

    #[test]
    fn test_bad_file_becomes_warning() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\nrows = \"many\"").unwrap();
        let (config, warnings) = load_config(Some(file.path()));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn test_oversized_file_refused() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let padding = "#".repeat(MAX_CONFIG_FILE_BYTES as usize + 1);
        file.write_all(padding.as_bytes()).unwrap();
        let (config, warnings) = load_config(Some(file.path()));
        assert_eq!(config, Config::default());
        assert!(warnings[0].contains("file too large"));
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (_, warnings) = load_config(Some(&dir.path().join("nope.toml")));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_zero_size_grid_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\nrows = 0").unwrap();
        let (config, warnings) = load_config(Some(file.path()));
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(warnings.len(), 1);
    }
}
