//! Similarity threshold cascade.
//!
//! Every eligible entry is scored against the query prompt once. The
//! thresholds are then tried in order; the first tier with at least one
//! candidate wins and *all* of its candidates are returned, shuffled, so
//! near-ties never settle into a stable favourite.

use crate::similarity::similarity;
use crate::types::{CascadeHit, CorpusEntry, ExclusionSet};
use rand::seq::SliceRandom;
use rand::Rng;

/// Tier thresholds, strictest first.
pub const CASCADE_THRESHOLDS: [f64; 3] = [0.90, 0.75, 0.45];

/// Whether an entry may be offered for `prompt` at all.
///
/// An entry whose response equals the query is never eligible, whatever
/// its score, so the input is never echoed back verbatim.
fn is_candidate(entry: &CorpusEntry, prompt: &str, excluded: &ExclusionSet) -> bool {
    !entry.response.is_empty() && entry.response != prompt && !excluded.contains(&entry.response)
}

/// Run the cascade and report which tier matched.
pub fn cascade<'a, I, R>(
    prompt: &str,
    entries: I,
    excluded: &ExclusionSet,
    rng: &mut R,
) -> Option<CascadeHit>
where
    I: IntoIterator<Item = &'a CorpusEntry>,
    R: Rng + ?Sized,
{
    let scored: Vec<(&CorpusEntry, f64)> = entries
        .into_iter()
        .filter(|entry| is_candidate(entry, prompt, excluded))
        .map(|entry| (entry, similarity(prompt, &entry.prompt)))
        .collect();

    for threshold in CASCADE_THRESHOLDS {
        let mut tier: Vec<CorpusEntry> = scored
            .iter()
            .filter(|(_, score)| *score >= threshold)
            .map(|(entry, _)| (*entry).clone())
            .collect();

        if !tier.is_empty() {
            tier.shuffle(rng);
            return Some(CascadeHit {
                threshold,
                entries: tier,
            });
        }
    }

    None
}

/// Entries close enough to `prompt`, in random order. Empty means stay silent.
pub fn find_matches<'a, I, R>(
    prompt: &str,
    entries: I,
    excluded: &ExclusionSet,
    rng: &mut R,
) -> Vec<CorpusEntry>
where
    I: IntoIterator<Item = &'a CorpusEntry>,
    R: Rng + ?Sized,
{
    cascade(prompt, entries, excluded, rng)
        .map(|hit| hit.entries)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn responses(entries: &[CorpusEntry]) -> Vec<&str> {
        let mut out: Vec<&str> = entries.iter().map(|e| e.response.as_str()).collect();
        out.sort();
        out
    }

    #[test]
    fn exact_prompt_matches_top_tier() {
        let corpus = vec![CorpusEntry::new("hello", "hi there")];
        let hit = cascade("hello", &corpus, &ExclusionSet::new(), &mut rng()).unwrap();
        assert_eq!(hit.threshold, 0.90);
        assert_eq!(responses(&hit.entries), vec!["hi there"]);
    }

    #[test]
    fn abbreviation_falls_to_second_tier() {
        let corpus = vec![CorpusEntry::new("how r u", "im good")];
        let hit = cascade("how are you", &corpus, &ExclusionSet::new(), &mut rng()).unwrap();
        assert_eq!(hit.threshold, 0.75);
        assert_eq!(responses(&hit.entries), vec!["im good"]);
    }

    #[test]
    fn strict_tier_shadows_looser_ones() {
        let corpus = vec![
            CorpusEntry::new("good morning", "morning!"),
            CorpusEntry::new("good morning", "hey"),
            CorpusEntry::new("good mornin", "sup"),
            CorpusEntry::new("good evening", "evening"),
        ];
        let hit = cascade("good morning", &corpus, &ExclusionSet::new(), &mut rng()).unwrap();
        assert_eq!(hit.threshold, 0.90);
        // "good mornin" scores 22/23 and belongs to the top tier; "good evening" does not
        assert_eq!(responses(&hit.entries), vec!["hey", "morning!", "sup"]);
    }

    #[test]
    fn no_tier_means_silence() {
        let corpus = vec![CorpusEntry::new("quantum chromodynamics", "yes")];
        assert!(find_matches("hi", &corpus, &ExclusionSet::new(), &mut rng()).is_empty());
    }

    #[test]
    fn excluded_response_never_returned_even_at_full_score() {
        let corpus = vec![
            CorpusEntry::new("hello", "banned"),
            CorpusEntry::new("hello there", "allowed"),
        ];
        let excluded: ExclusionSet = ["banned".to_string()].into_iter().collect();
        let hit = cascade("hello", &corpus, &excluded, &mut rng()).unwrap();
        assert_eq!(responses(&hit.entries), vec!["allowed"]);
    }

    #[test]
    fn response_equal_to_query_is_skipped() {
        let corpus = vec![CorpusEntry::new("ping", "ping")];
        assert!(find_matches("ping", &corpus, &ExclusionSet::new(), &mut rng()).is_empty());
    }

    #[test]
    fn empty_responses_are_ignored() {
        let corpus = vec![CorpusEntry::new("hello", "")];
        assert!(find_matches("hello", &corpus, &ExclusionSet::new(), &mut rng()).is_empty());
    }

    #[test]
    fn order_varies_between_calls() {
        let corpus: Vec<CorpusEntry> = (0..8)
            .map(|i| CorpusEntry::new("same prompt", format!("reply {i}")))
            .collect();
        let mut rng = rng();
        let first = find_matches("same prompt", &corpus, &ExclusionSet::new(), &mut rng);
        let orders: Vec<Vec<CorpusEntry>> = (0..5)
            .map(|_| find_matches("same prompt", &corpus, &ExclusionSet::new(), &mut rng))
            .collect();
        assert_eq!(first.len(), 8);
        assert!(orders.iter().any(|order| *order != first));
    }
}
