//! Loaded sound banks.

use std::fmt;
use std::sync::Arc;

use log::info;

use crate::error::{Error, Result, ResultExt};
use crate::parser::{parse_sound_bank_binary, parse_sound_bank_text_from};
use crate::resource::{ResourceKind, ResourceProvider};
use crate::types::{Cue, Sound, SoundBankFile};
use crate::wavebank::{WaveBank, WaveBankRegistry};

/// The encoding a sound bank was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    /// `<name>.xsb`
    Binary,
    /// `<name>_xsb.txt`
    Text,
}

impl fmt::Display for BankFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BankFormat::Binary => "binary",
            BankFormat::Text => "text",
        })
    }
}

/// A sound bank together with the wave banks it references.
///
/// Wave banks are loaded on first use and kept for the lifetime of the bank.
#[derive(Debug)]
pub struct SoundBank {
    file: SoundBankFile,
    format: BankFormat,
    registry: WaveBankRegistry,
}

impl SoundBank {
    /// Load the sound bank `name`.
    ///
    /// The binary encoding is tried first, then the text encoding under
    /// `<name>_xsb`.
    pub fn load(provider: Arc<dyn ResourceProvider>, name: &str) -> Result<Self> {
        Self::load_inner(provider, name)
            .with_context(|| format!("Failed loading XACT sound bank \"{}\"", name))
    }

    fn load_inner(provider: Arc<dyn ResourceProvider>, name: &str) -> Result<Self> {
        let (file, format) =
            if let Some(mut reader) = provider.open(name, ResourceKind::SoundBank)? {
                (parse_sound_bank_binary(&mut reader)?, BankFormat::Binary)
            } else if let Some(mut reader) =
                provider.open(&format!("{}_xsb", name), ResourceKind::SoundBankText)?
            {
                (parse_sound_bank_text_from(&mut reader)?, BankFormat::Text)
            } else {
                return Err(Error::NotFound {
                    what: "sound bank",
                    name: name.to_string(),
                });
            };

        info!("Loaded {} sound bank '{}': {}", format, name, file.info());
        Ok(Self::from_file(file, format, provider))
    }

    /// Wrap an already parsed bank.
    pub fn from_file(
        file: SoundBankFile,
        format: BankFormat,
        provider: Arc<dyn ResourceProvider>,
    ) -> Self {
        let registry = WaveBankRegistry::new(provider, file.wave_banks().iter().cloned());
        Self {
            file,
            format,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        self.file.name()
    }

    pub fn format(&self) -> BankFormat {
        self.format
    }

    /// The parsed contents.
    pub fn file(&self) -> &SoundBankFile {
        &self.file
    }

    pub fn cues(&self) -> &[Cue] {
        self.file.cues()
    }

    pub fn cue(&self, index: usize) -> Option<&Cue> {
        self.file.cues().get(index)
    }

    pub fn cue_by_name(&self, name: &str) -> Option<&Cue> {
        self.file.cue_by_name(name)
    }

    pub fn sounds(&self) -> &[Sound] {
        self.file.sounds()
    }

    pub fn wave_bank_names(&self) -> &[String] {
        self.file.wave_banks()
    }

    /// The wave bank `name`, loading it on first use.
    pub fn wave_bank(&self, name: &str) -> Result<Arc<WaveBank>> {
        self.registry.get(name)
    }

    pub fn registry(&self) -> &WaveBankRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_sound_bank;
    use crate::error::ErrorKind;
    use crate::parser::parse_sound_bank_text;
    use crate::resource::MemoryProvider;

    const TEXT: &str = "\
<soundbank> name=ui
<wavebank> name=ui_waves
<sound> name=click
<track>
<wave> bank=ui_waves index=0
<cue> name=click
<variation> weight_min=0 weight_max=0 sound=0
";

    #[test]
    fn test_load_binary() {
        let provider = MemoryProvider::new();
        let file = parse_sound_bank_text(TEXT).unwrap();
        provider.insert("ui", ResourceKind::SoundBank, encode_sound_bank(&file).unwrap());

        let bank = SoundBank::load(Arc::new(provider), "ui").unwrap();
        assert_eq!(bank.format(), BankFormat::Binary);
        assert_eq!(bank.file(), &file);
    }

    #[test]
    fn test_load_text() {
        let provider = MemoryProvider::new();
        provider.insert("ui_xsb", ResourceKind::SoundBankText, TEXT);

        let bank = SoundBank::load(Arc::new(provider), "ui").unwrap();
        assert_eq!(bank.format(), BankFormat::Text);
        assert_eq!(bank.name(), "ui");
        assert_eq!(bank.cues().len(), 1);
        assert_eq!(bank.cue(0).map(|c| c.name.as_str()), Some("click"));
        assert!(bank.cue_by_name("click").is_some());
        assert_eq!(bank.sounds()[0].name, "click");
        assert_eq!(bank.wave_bank_names(), ["ui_waves"]);
        assert!(!bank.registry().is_loaded("ui_waves"));
    }

    #[test]
    fn test_binary_is_preferred() {
        let provider = MemoryProvider::new();
        let (_, wave_banks, sounds, cues) = parse_sound_bank_text(TEXT).unwrap().into_parts();
        let file =
            SoundBankFile::new("from_binary".to_string(), wave_banks, sounds, cues).unwrap();
        provider.insert("ui", ResourceKind::SoundBank, encode_sound_bank(&file).unwrap());
        provider.insert("ui_xsb", ResourceKind::SoundBankText, TEXT);

        let bank = SoundBank::load(Arc::new(provider), "ui").unwrap();
        assert_eq!(bank.format(), BankFormat::Binary);
        assert_eq!(bank.name(), "from_binary");
    }

    #[test]
    fn test_load_missing() {
        let err = SoundBank::load(Arc::new(MemoryProvider::new()), "ghost").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.contexts(), vec!["Failed loading XACT sound bank \"ghost\""]);
    }

    #[test]
    fn test_load_corrupt_carries_context() {
        let provider = MemoryProvider::new();
        provider.insert("ui", ResourceKind::SoundBank, b"SDBK\x09\x00".to_vec());

        let err = SoundBank::load(Arc::new(provider), "ui").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceLoadFailure);
        assert!(err
            .to_string()
            .starts_with("Failed loading XACT sound bank \"ui\": "));
    }
}
