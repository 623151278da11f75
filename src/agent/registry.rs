//! Per-page bookkeeping for elements we have hidden.
//!
//! The registry is keyed by the driver's opaque node ids (arena pattern),
//! lives for one page lifetime, and is the only place the pre-hide style
//! state survives. It is never persisted or shared across pages.

use std::collections::HashMap;

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct HiddenRecord {
    pub selector: String,
    pub url: String,
    /// Inline visibility value at hide time; empty when it was unset.
    pub original_visibility: String,
}

#[derive(Debug, Default)]
pub struct HiddenRegistry {
    entries: HashMap<NodeId, HiddenRecord>,
}

impl HiddenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn insert(&mut self, node: NodeId, record: HiddenRecord) {
        self.entries.insert(node, record);
    }

    pub fn remove(&mut self, node: NodeId) -> Option<HiddenRecord> {
        self.entries.remove(&node)
    }

    /// Remove and return every entry recorded under the given pair.
    pub fn drain_matching(&mut self, selector: &str, url: &str) -> Vec<(NodeId, HiddenRecord)> {
        let nodes: Vec<NodeId> = self
            .entries
            .iter()
            .filter(|(_, r)| r.selector == selector && r.url == url)
            .map(|(n, _)| *n)
            .collect();

        nodes
            .into_iter()
            .filter_map(|n| self.entries.remove(&n).map(|r| (n, r)))
            .collect()
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.keys().copied().collect()
    }

    pub fn get(&self, node: NodeId) -> Option<&HiddenRecord> {
        self.entries.get(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(selector: &str) -> HiddenRecord {
        HiddenRecord {
            selector: selector.to_string(),
            url: "https://a.com/".to_string(),
            original_visibility: String::new(),
        }
    }

    #[test]
    fn insert_remove_round_trip() {
        let mut reg = HiddenRegistry::new();
        reg.insert(NodeId(1), record("#a"));

        assert!(reg.contains(NodeId(1)));
        assert_eq!(reg.remove(NodeId(1)).unwrap().selector, "#a");
        assert!(!reg.contains(NodeId(1)));
        assert!(reg.remove(NodeId(1)).is_none());
    }

    #[test]
    fn drain_matching_takes_only_the_pair() {
        let mut reg = HiddenRegistry::new();
        reg.insert(NodeId(1), record("#a"));
        reg.insert(NodeId(2), record("#a"));
        reg.insert(NodeId(3), record("#b"));

        let drained = reg.drain_matching("#a", "https://a.com/");
        assert_eq!(drained.len(), 2);
        assert_eq!(reg.len(), 1);
        assert!(reg.contains(NodeId(3)));
    }
}
