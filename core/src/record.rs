use crate::index::DocId;
use serde::{Deserialize, Serialize};

/// A paragraph-sized chunk as produced by ingestion and kept by a [`crate::ChunkStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    pub id: DocId,
    pub source_name: String,
    pub text: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub word_count: usize,
}

impl ChunkRecord {
    pub fn new(
        id: impl Into<DocId>,
        source_name: impl Into<String>,
        text: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self {
            id: id.into(),
            source_name: source_name.into(),
            text,
            created_at: created_at.into(),
            word_count,
        }
    }
}
