//! In-memory working copy of the corpus.
//!
//! Holds the entries used for matching together with the exclusion set,
//! so a single lock around a `Corpus` serializes every mutation.

use crate::matcher;
use crate::types::{CascadeHit, CorpusEntry, ExclusionSet};
use rand::Rng;

/// Entries plus the responses barred from reuse.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    excluded: ExclusionSet,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from persisted parts, dropping empty and excluded responses.
    pub fn from_parts(entries: Vec<CorpusEntry>, excluded: ExclusionSet) -> Self {
        let entries = entries
            .into_iter()
            .filter(|e| !e.response.is_empty() && !excluded.contains(&e.response))
            .collect();
        Self { entries, excluded }
    }

    /// Append an entry. Returns false if the response is empty or excluded.
    pub fn push(&mut self, entry: CorpusEntry) -> bool {
        if entry.response.is_empty() || self.excluded.contains(&entry.response) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Bar a response from matching and learning. Returns true if newly excluded.
    pub fn exclude(&mut self, response: &str) -> bool {
        self.excluded.insert(response)
    }

    pub fn is_excluded(&self, response: &str) -> bool {
        self.excluded.contains(response)
    }

    /// Remove every entry with exactly this response. Returns how many were removed.
    pub fn remove_response(&mut self, response: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.response != response);
        before - self.entries.len()
    }

    /// Run the match cascade against the current entries.
    pub fn cascade<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> Option<CascadeHit> {
        matcher::cascade(prompt, &self.entries, &self.excluded, rng)
    }

    /// Matching entries in random order; empty means stay silent.
    pub fn find_matches<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> Vec<CorpusEntry> {
        matcher::find_matches(prompt, &self.entries, &self.excluded, rng)
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn excluded(&self) -> &ExclusionSet {
        &self.excluded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
