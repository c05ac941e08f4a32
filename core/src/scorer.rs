use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Upper bound on the number of results a search returns.
pub const MAX_RESULTS: usize = 50;

/// How a result matched the query. Ranked TF-IDF search always yields `Fuzzy`;
/// `Exact` is reserved for a separate phrase/substring strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
    pub kind: MatchKind,
}

/// Rank documents against `query` by summed TF-IDF over the distinct query terms.
///
/// tf = count / doc length, idf = ln(N / df). Results are sorted by descending score,
/// ties by ascending doc id, and capped at [`MAX_RESULTS`]. An empty corpus or a query
/// with no surviving terms yields no results.
pub fn search(index: &InvertedIndex, query: &str) -> Vec<ScoredDoc> {
    let q_tokens = tokenize(query);
    if q_tokens.is_empty() || index.num_docs() == 0 {
        return Vec::new();
    }

    let n = index.num_docs() as f64;
    let mut seen: HashSet<&str> = HashSet::new();
    let mut scores: HashMap<&str, f64> = HashMap::new();
    for term in &q_tokens {
        if !seen.insert(term.as_str()) {
            continue;
        }
        let postings = index.term_posting(term);
        if postings.is_empty() {
            continue;
        }
        let idf = (n / postings.len() as f64).ln();
        for (doc_id, &count) in postings {
            let doc_len = index.doc_length(doc_id).filter(|&len| len > 0).unwrap_or(1);
            let tf = f64::from(count) / doc_len as f64;
            *scores.entry(doc_id.as_str()).or_insert(0.0) += tf * idf;
        }
    }

    let mut ranked: Vec<(&str, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(MAX_RESULTS);
    ranked
        .into_iter()
        .map(|(doc_id, score)| ScoredDoc {
            doc_id: doc_id.to_string(),
            score,
            kind: MatchKind::Fuzzy,
        })
        .collect()
}
