//! A set of package names.
//!
//! Membership is exact string equality. The persisted form is a JSON object
//! keyed by name with `true` values (`{"git": true}`); entries stored as
//! `false` are treated as absent when reading.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct NameSet(BTreeSet<String>);

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name. Returns `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of names present in both sets.
    pub fn intersection_len(&self, other: &NameSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Number of names present in either set.
    pub fn union_len(&self, other: &NameSet) -> usize {
        self.len() + other.len() - self.intersection_len(other)
    }
}

impl<S: Into<String>> FromIterator<S> for NameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, bool>> for NameSet {
    fn from(map: BTreeMap<String, bool>) -> Self {
        Self(
            map.into_iter()
                .filter_map(|(name, present)| present.then_some(name))
                .collect(),
        )
    }
}

impl From<NameSet> for BTreeMap<String, bool> {
    fn from(set: NameSet) -> Self {
        set.0.into_iter().map(|name| (name, true)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let set: NameSet = ["git", "go", "git"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("git"));
        assert!(!set.contains("Git"));
    }

    #[test]
    fn test_union_and_intersection() {
        let a: NameSet = ["a", "b", "c"].into_iter().collect();
        let b: NameSet = ["b", "c", "d", "e"].into_iter().collect();
        assert_eq!(a.intersection_len(&b), 2);
        assert_eq!(a.union_len(&b), 5);
        assert_eq!(a.union_len(&NameSet::new()), 3);
    }

    #[test]
    fn test_serializes_as_object() {
        let set: NameSet = ["wget", "git"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"git":true,"wget":true}"#);
    }

    #[test]
    fn test_false_entries_are_absent() {
        let set: NameSet = serde_json::from_str(r#"{"git": true, "go": false}"#).unwrap();
        assert!(set.contains("git"));
        assert!(!set.contains("go"));
        assert_eq!(set.len(), 1);
    }
}
