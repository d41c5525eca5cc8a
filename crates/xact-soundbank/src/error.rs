//! Error types for sound bank loading and cue playback.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The table a numeric index was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// The cue table of a sound bank.
    Cue,
    /// The sound table of a sound bank.
    Sound,
    /// The wave table of a wave bank.
    Wave,
    /// The wave bank name table of a sound bank.
    WaveBank,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::Cue => "cue",
            Table::Sound => "sound",
            Table::Wave => "wave",
            Table::WaveBank => "wave bank",
        })
    }
}

/// Broad classification of an [`Error`], independent of any attached context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource is absent in every supported encoding.
    NotFound,
    /// A cue name lookup missed.
    UnknownCue,
    /// A wave bank name was never declared by the sound bank.
    UnknownWaveBank,
    /// A numeric index is beyond the bound of its table.
    IndexOutOfRange,
    /// The variation query falls outside every declared interval.
    NoMatchingVariation,
    /// I/O, decode or structural parse failure in an underlying resource.
    ResourceLoadFailure,
    /// Invalid configuration.
    Config,
}

/// Errors that can occur while loading sound banks or resolving cues.
///
/// Errors that unwind through [`crate::SoundBank::load`] or one of the
/// `play_cue*` entry points are wrapped in [`Error::Context`] layers naming the
/// bank and cue involved. Use [`Error::kind`] to classify an error regardless
/// of how much context has been attached.
#[derive(Error, Debug)]
pub enum Error {
    /// No resource exists for the name in any supported encoding.
    #[error("No such {what} \"{name}\"")]
    NotFound {
        /// What was looked up ("sound bank", "wave bank", "wave").
        what: &'static str,
        /// The resource name.
        name: String,
    },

    /// The cue name is not registered in the sound bank.
    #[error("Cue \"{0}\" doesn't exist")]
    UnknownCue(String),

    /// The wave bank is not declared by the sound bank.
    #[error("Don't know wave bank \"{0}\"")]
    UnknownWaveBank(String),

    /// An index is beyond the size of its table.
    #[error("{table} index out of range ({index} >= {len})")]
    IndexOutOfRange {
        /// The table that was indexed.
        table: Table,
        /// The requested index.
        index: usize,
        /// The size of the table.
        len: usize,
    },

    /// No variation interval of the cue contains the query value.
    #[error("No variation {0}")]
    NoMatchingVariation(u32),

    /// Input/Output error while reading a resource.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// WAV decoding error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Structural error in a binary or text encoding.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Structural error in a text encoding, with its location.
    #[error("Failed to parse at line {line}: {message}")]
    ParseAt {
        /// Line number where the error occurred (1-based).
        line: usize,
        /// Error message describing the problem.
        message: String,
    },

    /// Invalid value for a text opcode.
    #[error("Invalid value '{value}' for {opcode}: expected {expected}")]
    InvalidValue {
        /// The opcode name.
        opcode: String,
        /// The offending value.
        value: String,
        /// Description of the expected type.
        expected: &'static str,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// An error with an identifying context attached.
    #[error("{context}: {source}")]
    Context {
        /// Description of the operation that failed.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify this error, looking through any attached context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::UnknownCue(_) => ErrorKind::UnknownCue,
            Error::UnknownWaveBank(_) => ErrorKind::UnknownWaveBank,
            Error::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Error::NoMatchingVariation(_) => ErrorKind::NoMatchingVariation,
            Error::Io(_)
            | Error::Wav(_)
            | Error::Parse(_)
            | Error::ParseAt { .. }
            | Error::InvalidValue { .. } => ErrorKind::ResourceLoadFailure,
            Error::Config(_) | Error::TomlParse(_) | Error::TomlSerialize(_) => ErrorKind::Config,
            Error::Context { source, .. } => source.kind(),
        }
    }

    /// The innermost error, below all context layers.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// The attached contexts, outermost first.
    pub fn contexts(&self) -> Vec<&str> {
        let mut contexts = Vec::new();
        let mut current = self;
        while let Error::Context { context, source } = current {
            contexts.push(context.as_str());
            current = source.as_ref();
        }
        contexts
    }

    /// Wrap this error with a context description.
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Adds context to the error of a [`Result`].
pub trait ResultExt<T> {
    /// Wrap the error, if any, with `context`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Wrap the error, if any, with a lazily built context.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Into::<Error>::into(e).context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Into::<Error>::into(e).context(f()))
    }
}
