use std::collections::HashMap;

use crate::parser::Entry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(pub(crate) usize);

/// The payload slot at one trie key. A tombstoned slot keeps its place in
/// the tree but is invisible to lookups and traversals, which keeps
/// re-insertion semantics separate from "no rules were ever stored here".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Cell {
    #[default]
    Vacant,
    Tombstone,
    Live(Vec<Entry>),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    children: HashMap<String, NodeId>,
    cell: Cell,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            cell: Cell::Vacant,
        }
    }
}

/// A prefix tree keyed by path segments. Keys are normalized patterns: no
/// leading slash, no trailing slash for directory rules. Wildcard keys like
/// `*` and `*.rb` are ordinary keys here; they are special only to the
/// lookup logic in the index.
#[derive(Clone, Debug)]
pub(crate) struct PathTrie {
    nodes: Vec<Node>,
}

impl PathTrie {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    fn root_id() -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Append `entry` to the live entries at `key`, starting a fresh live
    /// cell if the slot is vacant or tombstoned.
    pub(crate) fn insert(&mut self, key: &str, entry: Entry) {
        let id = self.id_for_key_mut(key);
        match &mut self.node_mut(id).cell {
            Cell::Live(entries) => entries.push(entry),
            cell => *cell = Cell::Live(vec![entry]),
        }
    }

    /// Mark `key` as removed. The slot stays allocated so the key remains
    /// in the tree, but lookups and traversals skip it from now on.
    pub(crate) fn tombstone(&mut self, key: &str) {
        let id = self.id_for_key_mut(key);
        self.node_mut(id).cell = Cell::Tombstone;
    }

    /// The live entries stored at exactly `key`, if any.
    pub(crate) fn get(&self, key: &str) -> Option<&[Entry]> {
        let id = self.id_for_key(key)?;
        match &self.node(id).cell {
            Cell::Live(entries) => Some(entries),
            _ => None,
        }
    }

    /// Visit the live entries at every prefix of `path`, from the root key
    /// down to the full key, stopping at the deepest stored segment.
    pub(crate) fn walk_path(&self, path: &str, mut visit: impl FnMut(&[Entry])) {
        let mut current = Self::root_id();
        if let Cell::Live(entries) = &self.node(current).cell {
            visit(entries);
        }
        for segment in segments(path) {
            match self.node(current).children.get(segment) {
                Some(&child) => current = child,
                None => return,
            }
            if let Cell::Live(entries) = &self.node(current).cell {
                visit(entries);
            }
        }
    }

    /// Visit every live cell in the tree. Order is unspecified.
    pub(crate) fn for_each_live(&self, mut visit: impl FnMut(&[Entry])) {
        for node in &self.nodes {
            if let Cell::Live(entries) = &node.cell {
                visit(entries);
            }
        }
    }

    /// Visit every live cell in the tree with mutable access to its entries.
    pub(crate) fn for_each_live_mut(&mut self, mut visit: impl FnMut(&mut Vec<Entry>)) {
        for node in &mut self.nodes {
            if let Cell::Live(entries) = &mut node.cell {
                visit(entries);
            }
        }
    }

    fn id_for_key(&self, key: &str) -> Option<NodeId> {
        let mut current = Self::root_id();
        for segment in segments(key) {
            current = *self.node(current).children.get(segment)?;
        }
        Some(current)
    }

    // Walk to the node for `key`, creating missing segments along the way.
    fn id_for_key_mut(&mut self, key: &str) -> NodeId {
        let mut current = Self::root_id();
        for segment in segments(key) {
            if let Some(&child) = self.nodes[current.0].children.get(segment) {
                current = child;
            } else {
                let child = NodeId(self.nodes.len());
                self.nodes.push(Node::new());
                self.nodes[current.0]
                    .children
                    .insert(segment.to_string(), child);
                current = child;
            }
        }
        current
    }
}

fn segments(key: &str) -> impl Iterator<Item = &str> {
    key.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pattern: &str, owners: &[&str]) -> Entry {
        Entry::new(pattern, owners.iter().map(|o| o.to_string()).collect())
    }

    fn patterns_at(entries: &[Entry]) -> Vec<String> {
        entries.iter().map(|e| e.pattern.clone()).collect()
    }

    #[test]
    fn test_walk_path_visits_prefixes_in_order() {
        let mut trie = PathTrie::new();
        trie.insert("docs", entry("docs/", &["@doc-owner"]));
        trie.insert("docs/api", entry("docs/api/", &["@api-owner"]));
        trie.insert("unrelated", entry("unrelated/", &["@other"]));

        let mut seen = Vec::new();
        trie.walk_path("docs/api/ref.md", |entries| {
            seen.extend(patterns_at(entries));
        });
        assert_eq!(seen, vec!["docs/".to_string(), "docs/api/".to_string()]);
    }

    #[test]
    fn test_insert_appends_at_same_key() {
        let mut trie = PathTrie::new();
        trie.insert("lib", entry("lib/", &["@a"]));
        trie.insert("lib", entry("lib/", &["@b"]));

        let entries = trie.get("lib").unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_vacant_interior_nodes_are_not_live() {
        let mut trie = PathTrie::new();
        trie.insert("a/b/c", entry("a/b/c", &["@x"]));

        assert!(trie.get("a").is_none());
        assert!(trie.get("a/b").is_none());
        assert!(trie.get("a/b/c").is_some());
    }

    #[test]
    fn test_tombstone_hides_key_from_all_reads() {
        let mut trie = PathTrie::new();
        trie.insert("lib", entry("lib/", &["@a"]));
        trie.tombstone("lib");

        assert!(trie.get("lib").is_none());

        let mut walked = 0;
        trie.walk_path("lib/x.go", |_| walked += 1);
        assert_eq!(walked, 0);

        let mut live = 0;
        trie.for_each_live(|_| live += 1);
        assert_eq!(live, 0);
    }

    #[test]
    fn test_reinsert_after_tombstone_starts_fresh() {
        let mut trie = PathTrie::new();
        trie.insert("lib", entry("lib/", &["@a"]));
        trie.tombstone("lib");
        trie.insert("lib", entry("lib/", &["@b"]));

        let entries = trie.get("lib").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].owners, vec!["@b".to_string()]);
    }

    #[test]
    fn test_tombstone_missing_key_allocates_slot() {
        let mut trie = PathTrie::new();
        trie.tombstone("ghost");
        assert!(trie.get("ghost").is_none());

        trie.insert("ghost", entry("ghost", &["@x"]));
        assert!(trie.get("ghost").is_some());
    }
}
