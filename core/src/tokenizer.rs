use crate::index::Term;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Shortest token length that survives tokenization.
pub const MIN_TERM_LEN: usize = 3;

lazy_static! {
    static ref NON_TERM_CHARS: Regex = Regex::new(r"[^a-z0-9\s]").expect("valid regex");
    // Apostrophes are stripped before the lookup, so contractions are stored without them.
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","also","am","an","and","any","are",
            "arent","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","cant","could","couldnt",
            "did","didnt","do","does","doesnt","doing","dont","down","during",
            "each",
            "few","for","from","further",
            "had","hadnt","has","hasnt","have","havent","having","he","her","here","hers","herself",
            "him","himself","his","how",
            "i","if","im","in","into","is","isnt","it","its","itself","ive",
            "just","lets","may","me","might","more","most","must","mustnt","my","myself",
            "no","nor","not",
            "of","off","on","once","only","or","other","ought","our","ours","ourselves","out",
            "over","own",
            "per","same","she","should","shouldnt","so","some","such",
            "than","that","thats","the","their","theirs","them","themselves","then","there","these",
            "they","theyre","theyve","this","those","through","to","too",
            "under","until","up","upon","us","very","via",
            "was","wasnt","we","were","werent","weve","what","when","where","which","while","who",
            "whom","whose","why","will","with","wont","would","wouldnt",
            "yet","you","youd","youll","your","youre","yours","yourself","yourselves","youve"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Tokenize text into index terms: lowercase, keep only `[a-z0-9]` and whitespace,
/// split on whitespace, then drop short tokens and stop-words.
///
/// Duplicates are kept in order; they drive term frequency. No stemming is applied,
/// so `fox` and `foxes` are distinct terms.
pub fn tokenize(text: &str) -> Vec<Term> {
    let lowered = text.to_lowercase();
    let cleaned = NON_TERM_CHARS.replace_all(&lowered, "");
    cleaned
        .split_whitespace()
        .filter(|token| token.len() >= MIN_TERM_LEN)
        .filter(|token| !is_stopword(token))
        .map(str::to_owned)
        .collect()
}
