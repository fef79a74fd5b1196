//! Configuration management for the registry tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (agentry.toml)
//! - Environment variables (AGENTRY_*)
//!
//! ## Example config file (agentry.toml):
//! ```toml
//! [registry]
//! path = "./registry"
//!
//! [validation]
//! verify_checksums = true
//! fail_on_stale_latest = false
//!
//! [export]
//! output_format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the registry tooling
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryToolConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistrySection,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationSection,

    /// Export settings
    #[serde(default)]
    pub export: ExportSection,
}

/// Registry location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Path to the registry root (directory holding `_registry.json`)
    #[serde(default = "default_registry_path")]
    pub path: PathBuf,
}

/// Validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSection {
    /// Verify artifact checksums after hydration
    #[serde(default = "default_true")]
    pub verify_checksums: bool,

    /// Treat a stale `latest` pointer as a failure in the validator CLI
    #[serde(default)]
    pub fail_on_stale_latest: bool,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSection {
    /// Output format for exported JSON
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Include the metadata document alongside the schema
    #[serde(default = "default_true")]
    pub include_meta: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
        }
    }
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            fail_on_stale_latest: false,
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            include_meta: true,
        }
    }
}

impl RegistryToolConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["agentry.toml", ".agentry.toml", "config/agentry.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "agentry", "schemas") {
            let xdg_config = config_dir.config_dir().join("agentry.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("AGENTRY")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Registry root path, resolved against the current directory
    pub fn registry_path(&self) -> PathBuf {
        if self.registry.path.is_absolute() {
            self.registry.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.registry.path)
        }
    }
}
