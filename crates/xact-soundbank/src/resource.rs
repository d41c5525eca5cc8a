//! Resource lookup.
//!
//! Sound banks, wave banks and wave files are opened by name and kind through
//! a [`ResourceProvider`]. A missing resource is `Ok(None)`, so callers can
//! check for one encoding and fall back to another.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::config::{Extensions, ResourceConfig};
use crate::error::Result;

/// Kind of a named resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Binary sound bank.
    SoundBank,
    /// Text sound bank, stored under `<name>_xsb`.
    SoundBankText,
    /// Binary wave bank.
    WaveBank,
    /// Text wave bank, stored under `<name>_xwb`.
    WaveBankText,
    /// A single WAV file referenced by a text wave bank.
    Wave,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::SoundBank,
        ResourceKind::SoundBankText,
        ResourceKind::WaveBank,
        ResourceKind::WaveBankText,
        ResourceKind::Wave,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::SoundBank => "sound bank",
            ResourceKind::SoundBankText => "text sound bank",
            ResourceKind::WaveBank => "wave bank",
            ResourceKind::WaveBankText => "text wave bank",
            ResourceKind::Wave => "wave",
        })
    }
}

/// A readable resource.
pub type ResourceReader = Box<dyn Read + Send>;

/// Opens resources by name and kind.
pub trait ResourceProvider: Send + Sync {
    /// Open a resource, or return `Ok(None)` if it does not exist.
    fn open(&self, name: &str, kind: ResourceKind) -> Result<Option<ResourceReader>>;
}

impl<P: ResourceProvider + ?Sized> ResourceProvider for Arc<P> {
    fn open(&self, name: &str, kind: ResourceKind) -> Result<Option<ResourceReader>> {
        (**self).open(name, kind)
    }
}

/// Looks up resources as `<dir>/<name>.<ext>` in a list of directories.
#[derive(Debug, Clone, Default)]
pub struct DirectoryProvider {
    search_paths: Vec<PathBuf>,
    extensions: Extensions,
}

impl DirectoryProvider {
    /// A provider searching `search_paths` in order, with default extensions.
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            extensions: Extensions::default(),
        }
    }

    /// A provider set up from a configuration.
    pub fn from_config(config: &ResourceConfig) -> Self {
        Self {
            search_paths: config.search_paths.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// The directories searched, in order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The first existing file for a resource.
    pub fn find(&self, name: &str, kind: ResourceKind) -> Option<PathBuf> {
        let file_name = format!("{}.{}", name, self.extensions.get(kind));
        self.search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }
}

impl ResourceProvider for DirectoryProvider {
    fn open(&self, name: &str, kind: ResourceKind) -> Result<Option<ResourceReader>> {
        match self.find(name, kind) {
            Some(path) => {
                debug!("Opening {} '{}' from {}", kind, name, path.display());
                let file = File::open(&path)?;
                Ok(Some(Box::new(BufReader::new(file))))
            }
            None => Ok(None),
        }
    }
}

/// Resources held in memory.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    resources: RwLock<HashMap<(String, ResourceKind), Arc<[u8]>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource.
    pub fn insert(&self, name: impl Into<String>, kind: ResourceKind, data: impl Into<Vec<u8>>) {
        let data: Arc<[u8]> = Arc::from(data.into());
        self.resources.write().insert((name.into(), kind), data);
    }

    /// Remove a resource, returning whether it existed.
    pub fn remove(&self, name: &str, kind: ResourceKind) -> bool {
        self.resources
            .write()
            .remove(&(name.to_string(), kind))
            .is_some()
    }

    /// Whether a resource exists.
    pub fn contains(&self, name: &str, kind: ResourceKind) -> bool {
        self.resources.read().contains_key(&(name.to_string(), kind))
    }
}

impl ResourceProvider for MemoryProvider {
    fn open(&self, name: &str, kind: ResourceKind) -> Result<Option<ResourceReader>> {
        let data = self.resources.read().get(&(name.to_string(), kind)).cloned();
        Ok(data.map(|data| Box::new(Cursor::new(data)) as ResourceReader))
    }
}
