//! Per-node attribute sets.
//!
//! `ids`, `classes` and `names` behave as ordered sets: adding a value that is
//! already present is a no-op, so a node never carries the same id twice.
//! Everything else is a plain sorted key/value map, which keeps attribute
//! emission deterministic.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    ids: Vec<String>,
    classes: Vec<String>,
    names: Vec<String>,
    values: BTreeMap<String, String>,
}

fn insert_unique(set: &mut Vec<String>, value: &str) -> bool {
    if value.is_empty() || set.iter().any(|v| v == value) {
        return false;
    }
    set.push(value.to_string());
    true
}

impl Attributes {
    pub const fn new() -> Self {
        Self {
            ids: Vec::new(),
            classes: Vec::new(),
            names: Vec::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
            && self.classes.is_empty()
            && self.names.is_empty()
            && self.values.is_empty()
    }

    // --- ids ---

    /// Add an id; returns false if it was already present.
    pub fn add_id(&mut self, id: &str) -> bool {
        insert_unique(&mut self.ids, id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    // --- classes ---

    pub fn add_class(&mut self, class: &str) -> bool {
        insert_unique(&mut self.classes, class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    // --- names ---

    pub fn add_name(&mut self, name: &str) -> bool {
        insert_unique(&mut self.names, name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    // --- key/value ---

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parse a value as a number; missing or malformed values give `None`.
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Key/value pairs in sorted key order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
