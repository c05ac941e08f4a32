use crate::index::DocId;
use crate::protocol::CorrelationToken;
use std::time::Duration;

/// Informational outcome of [`crate::InvertedIndex::index_document`]; never fatal.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("document {0:?} is already indexed")]
    AlreadyIndexed(DocId),
}

/// Why an inbound envelope could not be turned into a command.
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("unknown command kind {0:?}")]
    UnknownKind(String),

    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures seen by callers talking to the search worker.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("search worker has shut down")]
    WorkerClosed,

    #[error("correlation token {0} is already awaiting a reply")]
    DuplicateToken(CorrelationToken),

    #[error("reply for {0} was dropped before delivery")]
    ReplyDropped(CorrelationToken),

    #[error("no reply for {token} within {timeout:?}")]
    Timeout {
        token: CorrelationToken,
        timeout: Duration,
    },

    #[error("expected a {expected} reply, got {got}")]
    UnexpectedReply {
        expected: &'static str,
        got: &'static str,
    },
}

pub type Result<T> = core::result::Result<T, EngineError>;
