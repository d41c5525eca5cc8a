//! Configuration file support for the `xact` tool.
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/xact/config.toml`
//! - macOS: `~/Library/Application Support/xact/config.toml`
//! - Windows: `%APPDATA%\xact\config\config.toml`

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use xact_soundbank::{ResourceConfig, SoundType};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where sound banks, wave banks and waves are looked up
    pub resources: ResourceConfig,
    /// Offline rendering settings
    pub render: RenderSettings,
}

/// Settings for `xact render`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Upper bound on rendered length, for looping cues
    pub max_seconds: f64,
    /// Mixer category passed along with the stream
    pub sound_type: SoundType,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_seconds: 30.0,
            sound_type: SoundType::Sfx,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file at the default location yields the defaults; an
    /// explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let path = Self::config_path()?;
                if path.exists() {
                    Self::load_file(&path)
                } else {
                    log::debug!("No config file at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a TOML parse cannot.
    pub fn validate(&self) -> Result<()> {
        self.resources.validate()?;
        if !self.render.max_seconds.is_finite() || self.render.max_seconds <= 0.0 {
            anyhow::bail!(
                "render.max_seconds must be positive, got {}",
                self.render.max_seconds
            );
        }
        Ok(())
    }

    /// Put `dirs` in front of the configured search paths.
    pub fn prepend_search_paths(&mut self, dirs: &[PathBuf]) {
        let mut paths = dirs.to_vec();
        paths.append(&mut self.resources.search_paths);
        self.resources.search_paths = paths;
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "xact")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .context("Could not determine config directory")
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        Self::write_default_config(&path)?;
        Ok(path)
    }

    fn write_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

const DEFAULT_CONFIG: &str = r#"# xact configuration file

[resources]
# Directories searched for sound banks, wave banks and waves, in order.
# Directories given with --dir are searched first.
search_paths = ["."]

[resources.extensions]
sound_bank = "xsb"
sound_bank_text = "txt"
wave_bank = "xwb"
wave_bank_text = "txt"
wave = "wav"

[render]
# Looping cues are cut off after this many seconds
max_seconds = 30.0

# One of "music", "sfx", "voice", "video"
sound_type = "sfx"
"#;
