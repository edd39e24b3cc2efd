//! ---
//! mc_section: "01-specification-text"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Bracket parameter grammar and ordered parameter sets."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
//! Parameter grammar consumed by the configuration builders.
//!
//! Specification text is a whitespace separated list of `key=value` entries.
//! A value is a bracketed block (`key=[ ... ]`, nesting allowed, returned
//! unparsed), a double-quoted string, or a bare token. Keys may repeat; the
//! resulting [`ParameterSet`] keeps every entry in textual order.
#![warn(missing_docs)]

mod parser;
mod set;

pub use parser::{BracketParser, ParameterParser};
pub use set::ParameterSet;

use thiserror::Error;

/// Errors raised while parsing or querying parameter text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// An entry did not contain the `=` separator.
    #[error("expected '=' after key '{key}' at offset {offset}")]
    MissingSeparator {
        /// Key text read so far.
        key: String,
        /// Byte offset where the separator was expected.
        offset: usize,
    },
    /// An entry started with `=`.
    #[error("empty key at offset {offset}")]
    EmptyKey {
        /// Byte offset of the offending `=`.
        offset: usize,
    },
    /// A key contained a reserved character.
    #[error("invalid character {found:?} in key at offset {offset}")]
    InvalidKeyCharacter {
        /// The reserved character.
        found: char,
        /// Byte offset of the character.
        offset: usize,
    },
    /// A bracketed block was never closed.
    #[error("unbalanced '[' opened at offset {offset}")]
    UnbalancedBracket {
        /// Byte offset of the opening bracket.
        offset: usize,
    },
    /// A closing bracket appeared without a matching opening bracket.
    #[error("unexpected ']' at offset {offset}")]
    StrayBracket {
        /// Byte offset of the closing bracket.
        offset: usize,
    },
    /// A quoted value was never closed.
    #[error("unterminated quote opened at offset {offset}")]
    UnterminatedQuote {
        /// Byte offset of the opening quote.
        offset: usize,
    },
    /// A required key is absent.
    #[error("missing required parameter '{0}'")]
    Missing(String),
    /// A single-valued key appeared more than once.
    #[error("parameter '{key}' given {count} times, expected at most once")]
    Repeated {
        /// The repeated key.
        key: String,
        /// Number of occurrences.
        count: usize,
    },
    /// A key outside the accepted vocabulary was supplied.
    #[error("unknown parameter '{key}' (accepted: {accepted})")]
    UnknownKey {
        /// The unexpected key.
        key: String,
        /// Comma separated list of accepted keys.
        accepted: String,
    },
}

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, ParameterError>;
