//! In-process full-text search over short text chunks.
//!
//! A single [`worker::SearchWorker`] task owns the TF-IDF [`InvertedIndex`] and serves
//! `Index`, `Search` and `Reset` commands over channels; callers talk to it through an
//! [`EngineHandle`]. Chunk records themselves live in a [`ChunkStore`], and the index is
//! rebuilt from it at startup by replaying ordinary `Index` commands.

pub mod client;
pub mod error;
pub mod index;
pub mod protocol;
pub mod record;
pub mod scorer;
pub mod store;
pub mod tokenizer;
pub mod worker;

pub use client::{EngineConfig, EngineHandle, PendingReply};
pub use error::{EngineError, IndexError, ProtocolError};
pub use index::{DocId, InvertedIndex, Postings, Term};
pub use protocol::{Command, CorrelationToken, Envelope, Reply};
pub use record::ChunkRecord;
pub use scorer::{search, MatchKind, ScoredDoc, MAX_RESULTS};
pub use store::{resolve, ChunkStore, MemoryStore, SledStore};
