//! Configuration for the analyticstxt command line tool
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (analyticstxt.toml)
//! - Environment variables (ANALYTICSTXT__*)
//!
//! ## Example config file (analyticstxt.toml):
//! ```toml
//! [defaults]
//! draft = "2021-06-21"
//! lax = false
//!
//! [output]
//! format = "pretty"
//! force = false
//! ```

use std::path::Path;

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::validator::ValidationMode;
use crate::Options;

/// File name looked up in the working directory and the config directory
pub const CONFIG_FILE_NAME: &str = "analyticstxt.toml";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Defaults for draft selection and validation mode
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Defaults applied when a command line flag is not given
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Draft to validate against; the registry default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,

    /// Relax enumerated-value checks
    #[serde(default)]
    pub lax: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON layout for `parse`
    #[serde(default)]
    pub format: OutputFormat,

    /// Overwrite existing output files
    #[serde(default)]
    pub force: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

impl Settings {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file when `config_path` is set
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "analyticstxt.toml",
            ".analyticstxt.toml",
            "config/analyticstxt.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("org", "analyticstxt", "analyticstxt") {
            let xdg_config = dirs.config_dir().join(CONFIG_FILE_NAME);
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // ANALYTICSTXT__DEFAULTS__DRAFT=2021-04-13
        builder = builder.add_source(
            Environment::with_prefix("ANALYTICSTXT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = self
            .to_toml()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Options for `validate`, which always runs strict whatever `defaults.lax` says
    pub fn validate_options(&self, draft: Option<String>) -> Options {
        Options {
            draft: draft.or_else(|| self.defaults.draft.clone()),
            mode: ValidationMode::Strict,
        }
    }

    /// Call options from configured defaults, overridden by explicit flags
    pub fn options(&self, draft: Option<String>, lax: bool) -> Options {
        let mode = if lax || self.defaults.lax {
            ValidationMode::Lax
        } else {
            ValidationMode::Strict
        };
        Options {
            draft: draft.or_else(|| self.defaults.draft.clone()),
            mode,
        }
    }
}
