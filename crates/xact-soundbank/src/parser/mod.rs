//! Sound bank parsers.
//!
//! Both encodings produce the same [`SoundBankFile`]; callers never need to
//! know which one a bank was stored in.

use std::io::Read;

mod binary;
mod sections;
mod text;

pub use binary::{parse_sound_bank_binary, NO_WAVE_BANK, SOUND_BANK_MAGIC, SOUND_BANK_VERSION};
pub use sections::{read_sections, OpcodeValue, Section};
pub use text::parse_sound_bank_text;

pub(crate) use binary::{read_header, read_pstring};

use crate::error::Result;
use crate::types::SoundBankFile;

/// Read a whole resource as UTF-8 text.
pub(crate) fn read_text<R: Read + ?Sized>(reader: &mut R) -> Result<String> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(content)
}

/// Parse a text sound bank from a reader.
pub fn parse_sound_bank_text_from<R: Read + ?Sized>(reader: &mut R) -> Result<SoundBankFile> {
    parse_sound_bank_text(&read_text(reader)?)
}
