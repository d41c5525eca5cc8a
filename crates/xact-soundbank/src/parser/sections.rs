//! Section reader shared by the text sound bank and wave bank encodings.
//!
//! The text encodings are line oriented: a `<header>` opens a section, and
//! `key=value` opcodes that follow belong to it. Several tokens may share a
//! line, separated by whitespace, and `//` starts a comment.

use log::debug;
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map},
    multi::many0,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};

use crate::error::{Error, Result};

/// A section header with the opcodes that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Header name, without the angle brackets, lowercased.
    pub header: String,
    /// Line of the header (1-based).
    pub line: usize,
    /// Opcodes in file order.
    pub opcodes: Vec<(String, String)>,
}

impl Section {
    /// Raw value of an opcode. The last occurrence wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.opcodes
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse an optional opcode.
    pub fn value<T: OpcodeValue>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };

        match T::parse_opcode(raw) {
            Some(value) => Ok(Some(value)),
            None => {
                let invalid = Error::InvalidValue {
                    opcode: key.to_string(),
                    value: raw.to_string(),
                    expected: T::EXPECTED,
                };
                Err(self.error(invalid.to_string()))
            }
        }
    }

    /// Parse a required opcode.
    pub fn require<T: OpcodeValue>(&self, key: &str) -> Result<T> {
        self.value(key)?
            .ok_or_else(|| self.error(format!("Missing opcode '{}' in <{}>", key, self.header)))
    }

    /// Log opcodes not listed in `known`.
    pub fn ignore_unknown(&self, known: &[&str]) {
        for (key, value) in &self.opcodes {
            if !known.contains(&key.as_str()) {
                debug!(
                    "Ignoring unknown opcode {}={} in <{}> at line {}",
                    key, value, self.header, self.line
                );
            }
        }
    }

    /// An error located at this section's header.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::ParseAt {
            line: self.line,
            message: message.into(),
        }
    }

    /// Error for a section that needs a parent section before it.
    pub fn orphan(&self, parent: &str) -> Error {
        self.error(format!("<{}> without a preceding <{}>", self.header, parent))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Header(&'a str),
    Opcode(&'a str, &'a str),
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn header(input: &str) -> IResult<&str, Token<'_>> {
    map(delimited(char('<'), identifier, char('>')), Token::Header)(input)
}

fn opcode(input: &str) -> IResult<&str, Token<'_>> {
    map(
        separated_pair(identifier, char('='), take_while(|c: char| !c.is_whitespace())),
        |(key, value)| Token::Opcode(key, value),
    )(input)
}

fn tokens(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    all_consuming(terminated(
        many0(preceded(multispace0, alt((header, opcode)))),
        multispace0,
    ))(input)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Split text into sections.
///
/// Opcodes before the first header and malformed lines are errors.
pub fn read_sections(content: &str) -> Result<Vec<Section>> {
    let mut sections: Vec<Section> = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = strip_comment(raw);
        if text.trim().is_empty() {
            continue;
        }

        let (_, line_tokens) = tokens(text).map_err(|_| Error::ParseAt {
            line,
            message: format!("Malformed line '{}'", raw.trim()),
        })?;

        for token in line_tokens {
            match token {
                Token::Header(name) => sections.push(Section {
                    header: name.to_lowercase(),
                    line,
                    opcodes: Vec::new(),
                }),
                Token::Opcode(key, value) => {
                    let section = sections.last_mut().ok_or_else(|| Error::ParseAt {
                        line,
                        message: format!("Opcode '{}' outside of any section", key),
                    })?;
                    section.opcodes.push((key.to_string(), value.to_string()));
                }
            }
        }
    }

    Ok(sections)
}

/// Conversion of raw opcode text into typed values.
pub trait OpcodeValue: Sized {
    /// Description of the accepted values, for error messages.
    const EXPECTED: &'static str;

    /// Parse an opcode value from its raw text.
    fn parse_opcode(s: &str) -> Option<Self>;
}

impl OpcodeValue for String {
    const EXPECTED: &'static str = "string";

    fn parse_opcode(s: &str) -> Option<Self> {
        Some(s.to_string())
    }
}

impl OpcodeValue for u32 {
    const EXPECTED: &'static str = "unsigned integer";

    fn parse_opcode(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl OpcodeValue for usize {
    const EXPECTED: &'static str = "index";

    fn parse_opcode(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl OpcodeValue for f32 {
    const EXPECTED: &'static str = "float";

    fn parse_opcode(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl OpcodeValue for bool {
    const EXPECTED: &'static str = "boolean";

    /// Accepts yes/no, true/false, 1/0 and on/off.
    fn parse_opcode(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yes" | "true" | "1" | "on" => Some(true),
            "no" | "false" | "0" | "off" => Some(false),
            _ => None,
        }
    }
}
