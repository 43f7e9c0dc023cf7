//! # Configuration
//!
//! Optional `tscat.toml`:
//!
//! ```toml
//! catalog = "translations/dustrac-game_fi.ts"
//! include_unfinished = true
//! ```
//!
//! Precedence, highest first: CLI flag, environment, config file, default.
//!
//! ## Environment Variables
//!
//! - `TSCAT_CONFIG`: path of the config file (default: `./tscat.toml` if present)
//! - `TSCAT_CATALOG`: catalog path when `--catalog` is not given
//! - `TSCAT_LOG_FORMAT`: `json` for machine-parseable logs (read in `main`)

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tscat_core::{CatalogError, LoadOptions};

pub const CONFIG_ENV: &str = "TSCAT_CONFIG";
pub const CATALOG_ENV: &str = "TSCAT_CATALOG";
pub const DEFAULT_CONFIG_FILE: &str = "tscat.toml";

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub catalog: Option<PathBuf>,
    pub include_unfinished: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog: PathBuf,
    pub options: LoadOptions,
}

impl Config {
    /// Parse config text.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        toml::from_str(text)
            .map_err(|e| CatalogError::DeserializationError(format!("Invalid config: {}", e)))
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Find the config to use.
    ///
    /// An explicit path (flag, then `env_path`) must exist. Otherwise
    /// `tscat.toml` in the working directory is used when present, and the
    /// empty config when not.
    pub fn discover(explicit: Option<&Path>, env_path: Option<PathBuf>) -> Result<Self, CatalogError> {
        if let Some(path) = explicit {
            tracing::debug!("Using config {:?}", path);
            return Self::from_file(path);
        }
        if let Some(path) = env_path {
            tracing::debug!("Using config {:?} from {}", path, CONFIG_ENV);
            return Self::from_file(&path);
        }

        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            tracing::debug!("Using config {:?}", default);
            return Self::from_file(default);
        }
        Ok(Self::default())
    }

    /// Merge with CLI and environment values.
    pub fn resolve(
        &self,
        cli_catalog: Option<PathBuf>,
        env_catalog: Option<PathBuf>,
        no_unfinished: bool,
    ) -> Result<Settings, CatalogError> {
        let catalog = cli_catalog
            .or(env_catalog)
            .or_else(|| self.catalog.clone())
            .ok_or_else(|| {
                CatalogError::IoError(format!(
                    "No catalog given. Use --catalog, set {}, or add `catalog` to {}",
                    CATALOG_ENV, DEFAULT_CONFIG_FILE
                ))
            })?;

        let include_unfinished = if no_unfinished {
            false
        } else {
            self.include_unfinished
                .unwrap_or(LoadOptions::default().include_unfinished)
        };

        Ok(Settings {
            catalog,
            options: LoadOptions { include_unfinished },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = Config::from_toml_str(
            "catalog = \"translations/dustrac-game_fi.ts\"\ninclude_unfinished = false\n",
        )
        .expect("parse");
        assert_eq!(
            config.catalog,
            Some(PathBuf::from("translations/dustrac-game_fi.ts"))
        );
        assert_eq!(config.include_unfinished, Some(false));
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::from_toml_str("").expect("parse"), Config::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = Config::from_toml_str("catalogue = \"x.ts\"").expect_err("must reject");
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let config = Config {
            catalog: Some(PathBuf::from("file.ts")),
            include_unfinished: None,
        };

        let s = config
            .resolve(
                Some(PathBuf::from("cli.ts")),
                Some(PathBuf::from("env.ts")),
                false,
            )
            .expect("resolve");
        assert_eq!(s.catalog, PathBuf::from("cli.ts"));

        let s = config
            .resolve(None, Some(PathBuf::from("env.ts")), false)
            .expect("resolve");
        assert_eq!(s.catalog, PathBuf::from("env.ts"));

        let s = config.resolve(None, None, false).expect("resolve");
        assert_eq!(s.catalog, PathBuf::from("file.ts"));
        assert!(s.options.include_unfinished);
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let err = Config::default()
            .resolve(None, None, false)
            .expect_err("no catalog");
        assert!(err.to_string().contains("--catalog"));
    }

    #[test]
    fn no_unfinished_flag_overrides_config() {
        let config = Config {
            catalog: Some(PathBuf::from("file.ts")),
            include_unfinished: Some(true),
        };
        let s = config.resolve(None, None, true).expect("resolve");
        assert!(!s.options.include_unfinished);
    }
}
