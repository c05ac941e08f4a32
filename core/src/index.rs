use crate::error::IndexError;
use crate::tokenizer::tokenize;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Caller-supplied chunk identifier. Only ever used as a map key.
pub type DocId = String;
/// A normalized token produced by [`tokenize`].
pub type Term = String;
/// Occurrence count of one term per document. Counts are always >= 1.
pub type Postings = HashMap<DocId, u32>;

lazy_static! {
    static ref NO_POSTINGS: Postings = Postings::new();
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    postings: HashMap<Term, Postings>,
    doc_lengths: HashMap<DocId, usize>, // token count after filtering
    num_docs: u64,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Add a document. Documents are immutable once indexed: a second call with the
    /// same `doc_id` leaves the index untouched and reports [`IndexError::AlreadyIndexed`].
    pub fn index_document(&mut self, doc_id: &str, text: &str) -> Result<(), IndexError> {
        if self.doc_lengths.contains_key(doc_id) {
            return Err(IndexError::AlreadyIndexed(doc_id.to_string()));
        }

        // Build the per-document table first; shared state is only touched below.
        let tokens = tokenize(text);
        let doc_len = tokens.len();
        let mut tf: HashMap<Term, u32> = HashMap::new();
        for term in tokens {
            *tf.entry(term).or_insert(0) += 1;
        }

        self.doc_lengths.insert(doc_id.to_string(), doc_len);
        self.num_docs += 1;
        for (term, count) in tf {
            self.postings.entry(term).or_default().insert(doc_id.to_string(), count);
        }
        Ok(())
    }

    /// Drop every posting list and document length and zero the corpus counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Posting list for `term`; empty when the term has never been indexed.
    pub fn term_posting(&self, term: &str) -> &Postings {
        self.postings.get(term).unwrap_or(&*NO_POSTINGS)
    }

    pub fn doc_length(&self, doc_id: &str) -> Option<usize> {
        self.doc_lengths.get(doc_id).copied()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.doc_lengths.contains_key(doc_id)
    }

    /// Number of distinct documents accepted since creation or the last reset.
    pub fn num_docs(&self) -> u64 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.postings.len() }
}
