// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for Corduroy.
//!
//! Settings are read from YAML (`.yaml`/`.yml`) or TOML (`.toml`), chosen by
//! file extension. Every field has a default, so a missing file or an empty
//! document yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::scale::{CustomScaleDefinition, ScaleRegistry};
use crate::music::transpose::MAX_CAPO_FRET;
use crate::store::watcher::DEFAULT_DEBOUNCE_MS;

/// Application name used for default directories
pub const APP_NAME: &str = "corduroy";

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Format for a path, by extension. Unknown extensions are read as YAML.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the collection files; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Where exports are written; current directory when unset
    pub export_dir: Option<PathBuf>,
    /// tracing level filter ("error", "warn", "info", "debug", "trace")
    pub log_level: String,
    /// Quiet period before an external edit is reported
    pub watch_debounce_ms: u64,
    /// Capo fret assumed by `capo` when none is given
    pub default_capo: u8,
    /// Extra scales offered alongside the built-in ones
    pub custom_scales: Vec<CustomScaleDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            export_dir: None,
            log_level: "warn".to_string(),
            watch_debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_capo: 0,
            custom_scales: Vec::new(),
        }
    }
}

impl Config {
    /// Load a config file. The format follows the file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = match ConfigFormat::for_path(path) {
            ConfigFormat::Yaml => Self::from_yaml(&contents),
            ConfigFormat::Toml => Self::from_toml(&contents),
        }
        .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(?path, "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Save to a file, in the format its extension names
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = match ConfigFormat::for_path(path) {
            ConfigFormat::Yaml => self.to_yaml()?,
            ConfigFormat::Toml => self.to_toml()?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        fs::write(path, text).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Reject settings that can never work
    pub fn validate(&self) -> Result<()> {
        if self.default_capo > MAX_CAPO_FRET {
            bail!(
                "default_capo {} is out of range (0-{})",
                self.default_capo,
                MAX_CAPO_FRET
            );
        }
        if parse_level(&self.log_level).is_none() {
            bail!("unknown log_level {:?}", self.log_level);
        }
        Ok(())
    }

    /// Log level as a tracing filter
    pub fn level(&self) -> tracing::Level {
        parse_level(&self.log_level).unwrap_or(tracing::Level::WARN)
    }

    /// Data directory to open the store in
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_NAME)))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_NAME))
    }

    /// Directory exports are written to
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Built-in scales plus the configured custom ones
    pub fn scale_registry(&self) -> ScaleRegistry {
        let mut registry = ScaleRegistry::new();
        for def in &self.custom_scales {
            registry.register(def.clone());
        }
        registry
    }
}

/// `<config dir>/corduroy/config.yaml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join("config.yaml"))
}

fn parse_level(level: &str) -> Option<tracing::Level> {
    level.trim().parse().ok()
}
