//! Core types for the prompt/response corpus.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A learned pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CorpusEntry {
    /// Normalized prompt. Empty when the response had no identifiable antecedent.
    #[serde(default)]
    pub prompt: String,
    /// Stored response, mention-canonicalized. Never empty.
    pub response: String,
}

impl CorpusEntry {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// Responses barred from matching and learning after redaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    responses: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the response was not excluded before.
    pub fn insert(&mut self, response: &str) -> bool {
        self.responses.insert(response.to_string())
    }

    pub fn contains(&self, response: &str) -> bool {
        self.responses.contains(response)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl FromIterator<String> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            responses: iter.into_iter().collect(),
        }
    }
}

/// The tier that produced a match, with every entry at or above it.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeHit {
    /// Threshold of the tier that matched.
    pub threshold: f64,
    /// All candidates scoring at or above `threshold`, in random order.
    pub entries: Vec<CorpusEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_without_prompt_deserializes() {
        let entry: CorpusEntry = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert_eq!(entry, CorpusEntry::new("", "hi"));
    }

    #[test]
    fn exclusion_insert_reports_novelty() {
        let mut set = ExclusionSet::new();
        assert!(set.insert("bye"));
        assert!(!set.insert("bye"));
        assert!(set.contains("bye"));
        assert_eq!(set.len(), 1);
    }
}
