//! Parsing and querying of CODEOWNERS-style ownership rule files.
//!
//! A rule file maps path patterns to owners, one rule per line. This crate
//! parses those rules into an [`OwnerIndex`] — a path-segment trie — and
//! resolves the owners for any path by unioning every applicable rule:
//! enclosing directory rules, exact path rules, and the extension and bare
//! wildcard fallbacks.

pub mod parser;

mod error;
mod index;
mod path_trie;
mod pattern;

use std::{fs, path::Path};

pub use error::{Error, ParseErrors, SyntaxError};
pub use index::OwnerIndex;
pub use parser::{owner_kind, Entry, OwnerKind, ParseResult};
pub use pattern::{classify, Discipline};

/// Build an index from a rule file on disk. Strict: fails if the file
/// cannot be read or if any line is malformed, reporting every bad line.
/// For lenient building use [`parser::parse`] and
/// [`parser::ParseResult::into_index`].
pub fn from_path(path: impl AsRef<Path>) -> Result<OwnerIndex, Error> {
    let bytes = fs::read(path)?;
    Ok(parser::parse_bytes(&bytes).try_into_index()?)
}
