use chunkdex::{search, InvertedIndex, MatchKind, MAX_RESULTS};

fn sample_index() -> InvertedIndex {
    let mut idx = InvertedIndex::new();
    idx.index_document("a", "the quick brown fox jumps over the lazy dog").unwrap();
    idx.index_document("b", "foxes are quick and clever animals").unwrap();
    idx
}

#[test]
fn quick_fox_ranks_exact_token_match_first() {
    let idx = sample_index();
    let hits = search(&idx, "quick fox");

    let ids: Vec<&str> = hits.iter().map(|h| h.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    // "quick" is in both docs (idf 0); only "a" has "fox", since "foxes" is not stemmed.
    let expected_a = (1.0 / 6.0) * 2f64.ln();
    assert!((hits[0].score - expected_a).abs() < 1e-12);
    assert_eq!(hits[1].score, 0.0);
    assert!(hits.iter().all(|h| h.kind == MatchKind::Fuzzy));
}

#[test]
fn stopword_and_empty_queries_return_nothing() {
    let idx = sample_index();
    assert!(search(&idx, "").is_empty());
    assert!(search(&idx, "the and of").is_empty());
    assert!(search(&idx, "a an to ok").is_empty());
}

#[test]
fn unknown_terms_contribute_nothing() {
    let idx = sample_index();
    assert!(search(&idx, "zebra").is_empty());
    assert_eq!(search(&idx, "zebra fox"), search(&idx, "fox"));
}

#[test]
fn reindexing_is_idempotent() {
    let once = sample_index();
    let mut twice = sample_index();
    assert!(twice.index_document("a", "the quick brown fox jumps over the lazy dog").is_err());
    assert!(twice.index_document("b", "completely different words").is_err());

    assert_eq!(once, twice);
}

#[test]
fn corpus_counter_counts_distinct_ids_only() {
    let mut idx = InvertedIndex::new();
    for i in 0..7 {
        idx.index_document(&format!("doc-{i}"), "some indexed text").unwrap();
    }
    for i in 0..3 {
        let _ = idx.index_document(&format!("doc-{i}"), "replayed text");
    }
    assert_eq!(idx.num_docs(), 7);
}

#[test]
fn more_matching_terms_score_higher() {
    let mut idx = InvertedIndex::new();
    idx.index_document("both", "memory allocator design").unwrap();
    idx.index_document("one", "memory layout notes").unwrap();
    idx.index_document("none", "network protocol notes").unwrap();

    let hits = search(&idx, "memory allocator");
    assert_eq!(hits[0].doc_id, "both");
    assert_eq!(hits[1].doc_id, "one");
    assert_eq!(hits.len(), 2);
}

#[test]
fn results_are_capped_and_sorted() {
    let mut idx = InvertedIndex::new();
    for i in 0..120 {
        // vary length so scores differ
        let filler = "padding ".repeat(i % 9);
        idx.index_document(&format!("d{i:03}"), &format!("needle {filler}")).unwrap();
    }
    idx.index_document("other", "haystack only").unwrap();

    let hits = search(&idx, "needle");
    assert_eq!(hits.len(), MAX_RESULTS);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
        if pair[0].score == pair[1].score {
            assert!(pair[0].doc_id < pair[1].doc_id);
        }
    }
}

#[test]
fn reset_clears_everything() {
    let mut idx = sample_index();
    idx.reset();

    assert_eq!(idx.num_docs(), 0);
    assert_eq!(idx.num_terms(), 0);
    assert!(!idx.contains("a"));
    assert!(search(&idx, "quick fox").is_empty());
    assert_eq!(idx, InvertedIndex::new());
}
