//! # Result Map
//!
//! Research outputs keyed by output slot name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shared result mapping written by the fan-out and read by synthesis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMap {
    slots: BTreeMap<String, String>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a slot value, returning any previous value
    pub fn insert(&mut self, slot: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.slots.insert(slot.into(), value.into())
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResultMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ResultMap::new();
        for (slot, value) in iter {
            map.insert(slot, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut map = ResultMap::new();
        assert!(map.is_empty());
        assert_eq!(map.insert("ev_technology_result", "B"), None);
        assert_eq!(map.get("ev_technology_result"), Some("B"));
        assert!(!map.contains("carbon_capture_result"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let map: ResultMap = [("renewable_energy_result", "A")].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"renewable_energy_result":"A"}"#);
    }
}
