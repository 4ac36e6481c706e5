//! The ownership index: a path-segment trie of parsed rules plus the
//! lookup and mutation operations layered on top of it.

use std::collections::HashSet;
use std::io;

use tracing::debug;

use crate::error::ParseErrors;
use crate::parser::{self, Entry};
use crate::path_trie::PathTrie;
use crate::pattern::{file_extension, Discipline};

/// An in-memory index of ownership rules, keyed by normalized path pattern.
///
/// Lookups take `&self` and mutations `&mut self`, so within one thread the
/// borrow checker enforces that no mutation overlaps a read. For shared use
/// across threads, wrap the index in an `RwLock`; it holds no interior
/// mutability of its own.
#[derive(Clone, Debug)]
pub struct OwnerIndex {
    trie: PathTrie,
}

impl OwnerIndex {
    /// An empty index with no rules.
    pub fn new() -> Self {
        Self {
            trie: PathTrie::new(),
        }
    }

    /// Build an index from raw rule-file bytes. Strict: any malformed line
    /// fails the build with every collected error. For lenient building go
    /// through [`parser::parse_bytes`] and [`parser::ParseResult::into_index`].
    pub fn from_bytes(bytes: &[u8]) -> Result<OwnerIndex, ParseErrors> {
        parser::parse_bytes(bytes).try_into_index()
    }

    pub(crate) fn from_entries(entries: Vec<Entry>) -> Self {
        let mut index = Self::new();
        debug!(entries = entries.len(), "building owner index");
        for entry in entries {
            // Comment-only entries never reach the trie.
            if entry.discipline == Discipline::None {
                continue;
            }
            index.insert(entry);
        }
        index
    }

    /// Resolve the owners for `path`: the union of every applicable rule's
    /// owners, deduplicated. A path no rule matches yields an empty vec,
    /// never an error.
    ///
    /// Three sources are unioned. First, every Recursive, Absolute, or Flat
    /// entry stored along the prefix walk from the root to the full path —
    /// a file is owned by all enclosing directory rules, not just the
    /// nearest one. Then the extension wildcard key (`*.go` for `x/y.go`)
    /// and the bare `*` key, which apply regardless of nesting. Type
    /// entries met during the prefix walk are skipped; they only ever apply
    /// through their extension key.
    pub fn find_owners(&self, path: &str) -> Vec<String> {
        let path = normalize(path);
        let mut owners = Vec::new();

        self.trie.walk_path(path, |entries| {
            for entry in entries {
                match entry.discipline {
                    Discipline::Recursive | Discipline::Absolute | Discipline::Flat => {
                        owners.extend(entry.owners.iter().cloned());
                    }
                    Discipline::Type | Discipline::None => {}
                }
            }
        });

        let ext_key = format!("*{}", file_extension(path));
        for key in [ext_key.as_str(), "*"] {
            if let Some(entries) = self.trie.get(key) {
                for entry in entries {
                    owners.extend(entry.owners.iter().cloned());
                }
            }
        }

        dedup(owners)
    }

    /// Register `owners` for `pattern`, appending to any rules already
    /// stored at that key.
    pub fn add_owner<I, S>(&mut self, pattern: &str, owners: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pattern = pattern.strip_prefix('/').unwrap_or(pattern);
        let entry = Entry::new(pattern, owners.into_iter().map(Into::into).collect());
        debug!(pattern = entry.pattern.as_str(), discipline = ?entry.discipline, "adding rule");
        self.insert(entry);
    }

    /// Tombstone the rules at `pattern`. The key slot stays allocated in
    /// the tree, but lookups and traversals skip it; re-adding the same
    /// pattern later starts a fresh rule list. Unknown patterns are a
    /// no-op, not an error.
    pub fn remove_path(&mut self, pattern: &str) {
        debug!(pattern, "tombstoning path");
        self.trie.tombstone(normalize(pattern));
    }

    /// Remove every occurrence of `owner` from every live rule.
    pub fn remove_owner(&mut self, owner: &str) {
        debug!(owner, "removing owner");
        self.trie.for_each_live_mut(|entries| {
            for entry in entries {
                // Filter rather than remove-by-index: shifting a sequence
                // under its own iteration skips adjacent duplicates.
                entry.owners.retain(|o| o != owner);
            }
        });
    }

    /// Rewrite every occurrence of `old` to `new` across every live rule,
    /// preserving position and duplicate count.
    pub fn replace_owner(&mut self, old: &str, new: &str) {
        debug!(old, new, "replacing owner");
        self.trie.for_each_live_mut(|entries| {
            for entry in entries {
                for owner in entry.owners.iter_mut().filter(|o| o.as_str() == old) {
                    *owner = new.to_string();
                }
            }
        });
    }

    /// Render every live rule in the canonical line grammar, sorted
    /// lexicographically and joined with newlines. The sort makes the
    /// output identical for identical rule sets regardless of insertion
    /// history, so serialized indices can be diffed and round-tripped.
    pub fn serialize(&self) -> String {
        let mut lines = Vec::new();
        self.trie.for_each_live(|entries| {
            for entry in entries {
                lines.push(entry.render());
            }
        });
        lines.sort();
        lines.join("\n")
    }

    /// Write the canonical serialized form to `writer`.
    pub fn save_to(&self, mut writer: impl io::Write) -> io::Result<()> {
        writer.write_all(self.serialize().as_bytes())
    }

    fn insert(&mut self, entry: Entry) {
        let key = entry.key().to_string();
        self.trie.insert(&key, entry);
    }
}

impl Default for OwnerIndex {
    fn default() -> Self {
        Self::new()
    }
}

// Queries and stored keys share one normal form: no leading slash, no
// trailing slash.
fn normalize(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

// Dedup preserving first-seen order. Result order is not part of the
// public contract, but a deterministic order keeps callers' output stable.
fn dedup(owners: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    owners.into_iter().filter(|o| seen.insert(o.clone())).collect()
}
