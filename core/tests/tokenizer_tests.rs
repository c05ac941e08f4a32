use chunkdex::tokenizer::{is_stopword, tokenize};

#[test]
fn it_lowercases_and_does_not_stem() {
    let words = tokenize("Running Runners RUN! Foxes fox.");
    assert_eq!(words, vec!["running", "runners", "run", "foxes", "fox"]);
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(is_stopword("the"));
    assert!(!is_stopword("fox"));
}

#[test]
fn it_drops_short_tokens_and_keeps_digits() {
    let words = tokenize("go to v2 of rust 2024, an io api");
    assert_eq!(words, vec!["rust", "2024", "api"]);
}

#[test]
fn it_keeps_duplicates_in_order() {
    let words = tokenize("cache miss, cache hit, cache miss");
    assert_eq!(words, vec!["cache", "miss", "cache", "hit", "cache", "miss"]);
}

#[test]
fn it_is_deterministic() {
    let text = "Tokenizers must be pure: same input, same output — always!";
    assert_eq!(tokenize(text), tokenize(text));
}

#[test]
fn it_handles_empty_and_punctuation_only_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("!!! ... ??? ---").is_empty());
    assert!(tokenize("   \n\t  ").is_empty());
}
