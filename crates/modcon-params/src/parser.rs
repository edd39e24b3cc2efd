//! ---
//! mc_section: "01-specification-text"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Bracket parameter grammar and ordered parameter sets."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::iter::Peekable;
use std::str::CharIndices;

use crate::{ParameterError, ParameterSet, Result};

/// Turns raw specification text into a [`ParameterSet`].
pub trait ParameterParser {
    /// Parse `text` into ordered key/value entries.
    fn parse(&self, text: &str) -> Result<ParameterSet>;
}

/// Parser for the `key=value` / `key=[ block ]` grammar.
///
/// Bracketed blocks are returned verbatim (trimmed) so that callers can feed
/// them back into the parser for nested structures.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketParser;

impl BracketParser {
    /// Create a parser instance.
    pub fn new() -> Self {
        Self
    }
}

impl ParameterParser for BracketParser {
    fn parse(&self, text: &str) -> Result<ParameterSet> {
        let mut cursor = Cursor::new(text);
        let mut set = ParameterSet::new();
        while cursor.skip_whitespace() {
            let key = cursor.read_key()?;
            let value = cursor.read_value()?;
            set.push(key, value);
        }
        Ok(set)
    }
}

struct Cursor<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
        }
    }

    /// Returns false once the input is exhausted.
    fn skip_whitespace(&mut self) -> bool {
        while let Some((_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                return true;
            }
            self.chars.next();
        }
        false
    }

    fn read_key(&mut self) -> Result<String> {
        let mut key = String::new();
        loop {
            match self.chars.peek().copied() {
                None => {
                    return Err(ParameterError::MissingSeparator {
                        key,
                        offset: self.text.len(),
                    })
                }
                Some((offset, '=')) => {
                    self.chars.next();
                    if key.is_empty() {
                        return Err(ParameterError::EmptyKey { offset });
                    }
                    return Ok(key);
                }
                Some((offset, c)) if c.is_whitespace() => {
                    return Err(ParameterError::MissingSeparator { key, offset });
                }
                Some((offset, ']')) => return Err(ParameterError::StrayBracket { offset }),
                Some((offset, found @ ('[' | '"'))) => {
                    return Err(ParameterError::InvalidKeyCharacter { found, offset });
                }
                Some((_, c)) => {
                    key.push(c);
                    self.chars.next();
                }
            }
        }
    }

    fn read_value(&mut self) -> Result<String> {
        match self.chars.peek().copied() {
            None => Ok(String::new()),
            Some((_, c)) if c.is_whitespace() => Ok(String::new()),
            Some((offset, '[')) => {
                self.chars.next();
                self.read_block(offset)
            }
            Some((offset, '"')) => {
                self.chars.next();
                self.read_quoted(offset)
            }
            Some(_) => self.read_bare(),
        }
    }

    fn read_block(&mut self, open: usize) -> Result<String> {
        let mut depth = 1usize;
        while let Some((offset, c)) = self.chars.next() {
            match c {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.text[open + 1..offset].trim().to_owned());
                    }
                }
                '"' => {
                    self.read_quoted(offset)?;
                }
                _ => {}
            }
        }
        Err(ParameterError::UnbalancedBracket { offset: open })
    }

    fn read_quoted(&mut self, open: usize) -> Result<String> {
        let mut value = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '"' => return Ok(value),
                '\\' => match self.chars.peek().copied() {
                    Some((_, escaped @ ('"' | '\\'))) => {
                        value.push(escaped);
                        self.chars.next();
                    }
                    _ => value.push('\\'),
                },
                other => value.push(other),
            }
        }
        Err(ParameterError::UnterminatedQuote { offset: open })
    }

    fn read_bare(&mut self) -> Result<String> {
        let mut value = String::new();
        while let Some((offset, c)) = self.chars.peek().copied() {
            if c.is_whitespace() {
                break;
            }
            if c == ']' {
                return Err(ParameterError::StrayBracket { offset });
            }
            value.push(c);
            self.chars.next();
        }
        Ok(value)
    }
}
