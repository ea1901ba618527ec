//! The named fragments a writer produces.

use std::collections::BTreeMap;

use crate::diagnostics::Diagnostic;

/// Named output fragments (`whole`, `body`, `head`, ...) plus the problems
/// recovered while producing them.
///
/// Sorted by name so that iterating or serializing is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Parts {
    parts: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl Parts {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.parts.insert(name.to_string(), value.into());
    }

    pub(crate) fn set_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics = diagnostics;
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.parts.get(name).map(String::as_str)
    }

    /// The fully assembled document (empty if the writer produced none).
    pub fn whole(&self) -> &str {
        self.get("whole").unwrap_or_default()
    }

    /// Part names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parts.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
