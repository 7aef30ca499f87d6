use echo_corpus::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("corpus.db");
    let mut rng = StdRng::seed_from_u64(42);

    // Seed a small corpus, two prompts sharing one response
    {
        let store = SqliteCorpusStore::open(&db_path).unwrap();
        store.append(&CorpusEntry::new("hello", "hi there")).unwrap();
        store.append(&CorpusEntry::new("hey", "hi there")).unwrap();
        store.append(&CorpusEntry::new("how r u", "im good")).unwrap();
        assert_eq!(store.count().unwrap(), 3);
    }

    // Reopen and hydrate
    let store = SqliteCorpusStore::open(&db_path).unwrap();
    let mut corpus = store.load_corpus().unwrap();
    assert_eq!(corpus.len(), 3);

    // Exact prompt hits the strictest tier
    let hit = corpus.cascade("hello", &mut rng).unwrap();
    assert_eq!(hit.threshold, 0.90);
    assert_eq!(hit.entries[0].response, "hi there");

    // Close-enough prompt falls through to the middle tier
    let hit = corpus.cascade("how are you", &mut rng).unwrap();
    assert_eq!(hit.threshold, 0.75);
    assert_eq!(hit.entries[0].response, "im good");

    // Redact "hi there": exclusion first, then deletion
    corpus.exclude("hi there");
    let deleted = store.delete_by_response("hi there").unwrap();
    assert_eq!(deleted, 2);
    store.record_exclusion("hi there").unwrap();
    corpus.remove_response("hi there");
    assert!(corpus.find_matches("hello", &mut rng).is_empty());

    // The redaction survives a restart and blocks relearning
    drop(store);
    let store = SqliteCorpusStore::open(&db_path).unwrap();
    let mut corpus = store.load_corpus().unwrap();
    assert_eq!(corpus.len(), 1);
    assert!(!corpus.push(CorpusEntry::new("hello", "hi there")));
    assert_eq!(store.count_by_response("hi there").unwrap(), 0);

    // Flat JSON roundtrip of the surviving pairs
    let json = serde_json::to_string(corpus.entries()).unwrap();
    let recovered: Vec<CorpusEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, corpus.entries());
}
