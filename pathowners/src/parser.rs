//! Line-oriented parsing of ownership rule files.
//!
//! Each non-blank line is either a comment (first character `#`) or a rule:
//! a path pattern followed by one or more owners and an optional trailing
//! comment. Malformed lines are collected as [`SyntaxError`]s rather than
//! aborting the parse, so a whole file can be validated in one pass.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ParseErrors, SyntaxError};
use crate::index::OwnerIndex;
use crate::pattern::{classify, Discipline};

/// Parse a rule file, discarding comment-only lines.
pub fn parse(source: &str) -> ParseResult {
    parse_inner(source, false)
}

/// Parse a rule file, retaining comment-only lines as entries with
/// discipline [`Discipline::None`].
pub fn parse_with_comments(source: &str) -> ParseResult {
    parse_inner(source, true)
}

/// Parse a rule file from a raw byte buffer. The buffer is split on `\n`
/// and each line is decoded lossily, so the parser never fails on encoding.
pub fn parse_bytes(bytes: &[u8]) -> ParseResult {
    let mut result = ParseResult {
        entries: Vec::new(),
        errors: Vec::new(),
    };

    let mut start = 0;
    let mut number = 1;
    for end in memchr::memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
        let mut line = &bytes[start..end];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        collect_line(&String::from_utf8_lossy(line), number, false, &mut result);
        start = end + 1;
        number += 1;
    }
    result
}

fn parse_inner(source: &str, include_comments: bool) -> ParseResult {
    let mut result = ParseResult {
        entries: Vec::new(),
        errors: Vec::new(),
    };
    for (idx, line) in source.lines().enumerate() {
        collect_line(line, idx + 1, include_comments, &mut result);
    }
    result
}

fn collect_line(line: &str, number: usize, include_comments: bool, result: &mut ParseResult) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match parse_line(line) {
        Ok(entry) => {
            if entry.discipline != Discipline::None || include_comments {
                result.entries.push(entry);
            }
        }
        Err(message) => result.errors.push(SyntaxError::new(number, message)),
    }
}

/// The result of parsing a rule file: the entries in file order plus any
/// syntax errors encountered. A non-empty error list means some lines were
/// skipped; an empty one means the file parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub entries: Vec<Entry>,
    pub errors: Vec<SyntaxError>,
}

impl ParseResult {
    /// Build an index from the parsed entries, ignoring any syntax errors
    /// (lenient mode: bad lines are simply skipped).
    pub fn into_index(self) -> OwnerIndex {
        OwnerIndex::from_entries(self.entries)
    }

    /// Build an index only if the whole file parsed cleanly (strict mode).
    /// On failure, every collected error is returned.
    pub fn try_into_index(self) -> Result<OwnerIndex, ParseErrors> {
        if self.errors.is_empty() {
            Ok(OwnerIndex::from_entries(self.entries))
        } else {
            Err(ParseErrors(self.errors))
        }
    }
}

/// One parsed rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Normalized pattern: leading slash stripped, trailing slash kept so
    /// directory rules serialize back with it.
    pub pattern: String,
    pub discipline: Discipline,
    /// Owner tokens in file order. Duplicates within one entry are allowed.
    pub owners: Vec<String>,
    /// Trailing comment text, without the `#` marker.
    pub comment: Option<String>,
}

impl Entry {
    pub(crate) fn new(pattern: impl Into<String>, owners: Vec<String>) -> Entry {
        let pattern = pattern.into();
        let discipline = classify(&pattern);
        Entry {
            pattern,
            discipline,
            owners,
            comment: None,
        }
    }

    fn comment_only(text: &str) -> Entry {
        Entry {
            pattern: String::new(),
            discipline: Discipline::None,
            owners: Vec::new(),
            comment: Some(text.to_string()),
        }
    }

    /// The trie key for this entry: the pattern with a single trailing
    /// slash stripped, since the key space is slash-free for directory
    /// rules.
    pub(crate) fn key(&self) -> &str {
        self.pattern.strip_suffix('/').unwrap_or(&self.pattern)
    }

    /// Render the entry in the canonical line grammar.
    pub(crate) fn render(&self) -> String {
        let mut line = self.pattern.clone();
        for owner in &self.owners {
            line.push(' ');
            line.push_str(owner);
        }
        if let Some(comment) = &self.comment {
            line.push_str(" # ");
            line.push_str(comment);
        }
        line
    }
}

fn parse_line(line: &str) -> Result<Entry, String> {
    if let Some(rest) = line.strip_prefix('#') {
        return Ok(Entry::comment_only(rest.trim()));
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        // A lone owner token means the path was forgotten; anything else
        // is malformed outright.
        return Err(match tokens.first() {
            Some(token) if owner_kind(token).is_some() => "missing path".to_string(),
            _ => "invalid entry".to_string(),
        });
    }

    // The leading slash only anchors reasoning about "absolute"; the trie
    // is already rooted at the file-tree root, so the key space drops it.
    let pattern = tokens[0].strip_prefix('/').unwrap_or(tokens[0]);

    let mut owners = Vec::new();
    let mut comment = None;
    for (i, token) in tokens[1..].iter().enumerate() {
        if token.starts_with('#') {
            let joined = tokens[i + 1..].join(" ");
            comment = Some(joined[1..].trim().to_string());
            break;
        }
        if owner_kind(token).is_none() {
            return Err(format!("invalid owner: {}", token));
        }
        owners.push(token.to_string());
    }

    let mut entry = Entry::new(pattern, owners);
    entry.comment = comment;
    Ok(entry)
}

/// Classification of a syntactically valid owner token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind {
    /// `@name`
    User,
    /// `@group/subgroup`
    Team,
    /// `jane@example.com`
    Email,
}

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

/// Classify an owner token, or `None` if the token is not a valid owner.
/// Valid owners are `@` handles containing exactly one `@`, possibly with a
/// nested group path, or email addresses; length is bounded at 254.
pub fn owner_kind(token: &str) -> Option<OwnerKind> {
    if token.is_empty() || token.len() > 254 {
        return None;
    }
    if let Some(rest) = token.strip_prefix('@') {
        if rest.contains('@') {
            return None;
        }
        return Some(if rest.contains('/') {
            OwnerKind::Team
        } else {
            OwnerKind::User
        });
    }
    if EMAIL_PATTERN.is_match(token) {
        return Some(OwnerKind::Email);
    }
    None
}
