//! By-name cache of the wave banks a sound bank references.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::resource::ResourceProvider;

use super::WaveBank;

/// Lazily loaded wave banks, one slot per declared name.
///
/// Each slot has its own lock, so a first load only blocks callers asking
/// for the same bank. A failed load leaves the slot empty and the next
/// access tries again.
pub struct WaveBankRegistry {
    provider: Arc<dyn ResourceProvider>,
    entries: HashMap<String, Mutex<Option<Arc<WaveBank>>>>,
}

impl WaveBankRegistry {
    /// A registry with an empty slot for every name in `names`.
    pub fn new<I, S>(provider: Arc<dyn ResourceProvider>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .map(|name| (name.into(), Mutex::new(None)))
            .collect();

        Self { provider, entries }
    }

    /// The wave bank `name`, loading it on first use.
    pub fn get(&self, name: &str) -> Result<Arc<WaveBank>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::UnknownWaveBank(name.to_string()))?;

        let mut slot = entry.lock();
        if let Some(bank) = slot.as_ref() {
            debug!("Wave bank '{}' already loaded", name);
            return Ok(Arc::clone(bank));
        }

        let bank = Arc::new(WaveBank::load(self.provider.as_ref(), name)?);
        *slot = Some(Arc::clone(&bank));
        Ok(bank)
    }

    /// Whether `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether `name` has been loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .map(|entry| entry.lock().is_some())
            .unwrap_or(false)
    }

    /// Number of declared wave banks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for WaveBankRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("WaveBankRegistry")
            .field("wave_banks", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_wave_bank;
    use crate::error::ErrorKind;
    use crate::resource::{MemoryProvider, ResourceKind};
    use crate::testing::CountingProvider;
    use crate::wavebank::WaveData;
    use std::thread;

    fn provider_with(name: &str) -> Arc<CountingProvider> {
        let memory = MemoryProvider::new();
        let bytes = encode_wave_bank(name, &[WaveData::new(1, 8000, vec![1i16, 2])]).unwrap();
        memory.insert(name, ResourceKind::WaveBank, bytes);
        Arc::new(CountingProvider::new(memory))
    }

    #[test]
    fn test_loads_once() {
        let provider = provider_with("sfx");
        let registry = WaveBankRegistry::new(provider.clone(), ["sfx"]);

        assert!(!registry.is_loaded("sfx"));
        let first = registry.get("sfx").unwrap();
        let second = registry.get("sfx").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.is_loaded("sfx"));
        assert_eq!(provider.opens("sfx", ResourceKind::WaveBank), 1);
    }

    #[test]
    fn test_unknown_wave_bank() {
        let registry = WaveBankRegistry::new(provider_with("sfx"), ["sfx"]);
        let err = registry.get("music").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownWaveBank);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let provider = Arc::new(CountingProvider::new(MemoryProvider::new()));
        let registry = WaveBankRegistry::new(provider.clone(), ["late"]);

        let err = registry.get("late").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!registry.is_loaded("late"));

        let bytes = encode_wave_bank("late", &[WaveData::new(1, 8000, vec![0i16])]).unwrap();
        provider.inner().insert("late", ResourceKind::WaveBank, bytes);

        assert_eq!(registry.get("late").unwrap().len(), 1);
        assert_eq!(provider.opens("late", ResourceKind::WaveBank), 2);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let provider = provider_with("sfx");
        let registry = WaveBankRegistry::new(provider.clone(), ["sfx"]);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| registry.get("sfx").unwrap());
            }
        });

        assert_eq!(provider.opens("sfx", ResourceKind::WaveBank), 1);
    }
}
