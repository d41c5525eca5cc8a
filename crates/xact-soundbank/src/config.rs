//! Resource lookup configuration.
//!
//! ```toml
//! search_paths = ["data/sound", "override"]
//!
//! [extensions]
//! sound_bank = "xsb"
//! sound_bank_text = "txt"
//! wave_bank = "xwb"
//! wave_bank_text = "txt"
//! wave = "wav"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resource::ResourceKind;

/// Where and how [`crate::DirectoryProvider`] looks for resources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Directories searched in order.
    pub search_paths: Vec<PathBuf>,
    /// File extension per resource kind.
    pub extensions: Extensions,
}

impl ResourceConfig {
    /// A configuration searching the given directories with default extensions.
    pub fn with_search_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: paths.into_iter().map(Into::into).collect(),
            extensions: Extensions::default(),
        }
    }

    /// Parse a configuration from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ResourceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that every extension is usable in a file name.
    pub fn validate(&self) -> Result<()> {
        for kind in ResourceKind::ALL {
            let ext = self.extensions.get(kind);
            if ext.is_empty() || ext.contains(['/', '\\', '.']) {
                return Err(Error::Config(format!(
                    "Invalid extension '{}' for {}",
                    ext, kind
                )));
            }
        }
        Ok(())
    }
}

/// File extensions, without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extensions {
    pub sound_bank: String,
    pub sound_bank_text: String,
    pub wave_bank: String,
    pub wave_bank_text: String,
    pub wave: String,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            sound_bank: "xsb".to_string(),
            sound_bank_text: "txt".to_string(),
            wave_bank: "xwb".to_string(),
            wave_bank_text: "txt".to_string(),
            wave: "wav".to_string(),
        }
    }
}

impl Extensions {
    /// The extension used for `kind`.
    pub fn get(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::SoundBank => &self.sound_bank,
            ResourceKind::SoundBankText => &self.sound_bank_text,
            ResourceKind::WaveBank => &self.wave_bank,
            ResourceKind::WaveBankText => &self.wave_bank_text,
            ResourceKind::Wave => &self.wave,
        }
    }
}
