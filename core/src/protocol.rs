//! Wire format between callers and the search worker.
//!
//! Inbound frames are loose [`Envelope`]s so that a transport can hand over whatever it
//! received; the worker decodes them into a typed [`Command`]. Outbound frames are typed
//! [`Reply`]s tagged on `kind`.

use crate::error::ProtocolError;
use crate::index::DocId;
use crate::scorer::ScoredDoc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-generated identifier pairing a request with its reply.
pub type CorrelationToken = String;

pub const KIND_INDEX: &str = "Index";
pub const KIND_SEARCH: &str = "Search";
pub const KIND_RESET: &str = "Reset";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub kind: String,
    pub correlation_token: CorrelationToken,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Index { doc_id: DocId, text: String },
    Search { query: String },
    Reset,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexPayload {
    doc_id: DocId,
    text: String,
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Index { .. } => KIND_INDEX,
            Command::Search { .. } => KIND_SEARCH,
            Command::Reset => KIND_RESET,
        }
    }

    pub fn into_envelope(self, correlation_token: CorrelationToken) -> Envelope {
        let kind = self.kind().to_string();
        let payload = match self {
            Command::Index { doc_id, text } => serde_json::json!({ "docId": doc_id, "text": text }),
            Command::Search { query } => Value::String(query),
            Command::Reset => Value::Null,
        };
        Envelope { kind, correlation_token, payload }
    }
}

impl Envelope {
    pub fn command(&self) -> Result<Command, ProtocolError> {
        match self.kind.as_str() {
            KIND_INDEX => {
                let p: IndexPayload =
                    serde_json::from_value(self.payload.clone()).map_err(|source| {
                        ProtocolError::MalformedPayload { kind: KIND_INDEX, source }
                    })?;
                Ok(Command::Index { doc_id: p.doc_id, text: p.text })
            }
            KIND_SEARCH => {
                let query: String =
                    serde_json::from_value(self.payload.clone()).map_err(|source| {
                        ProtocolError::MalformedPayload { kind: KIND_SEARCH, source }
                    })?;
                Ok(Command::Search { query })
            }
            KIND_RESET => Ok(Command::Reset),
            other => Err(ProtocolError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Reply {
    IndexComplete {
        #[serde(rename = "correlationToken")]
        correlation_token: CorrelationToken,
    },
    SearchResults {
        #[serde(rename = "correlationToken")]
        correlation_token: CorrelationToken,
        payload: Vec<ScoredDoc>,
    },
    ResetComplete {
        #[serde(rename = "correlationToken")]
        correlation_token: CorrelationToken,
    },
}

impl Reply {
    pub fn correlation_token(&self) -> &str {
        match self {
            Reply::IndexComplete { correlation_token }
            | Reply::SearchResults { correlation_token, .. }
            | Reply::ResetComplete { correlation_token } => correlation_token,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Reply::IndexComplete { .. } => "IndexComplete",
            Reply::SearchResults { .. } => "SearchResults",
            Reply::ResetComplete { .. } => "ResetComplete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::MatchKind;

    #[test]
    fn decodes_wire_envelopes() {
        let raw = r#"{"kind":"Index","correlationToken":"t1",
            "payload":{"docId":"c1","text":"hello world"}}"#;
        let env: Envelope = serde_json::from_str(raw).unwrap();
        let expected = Command::Index { doc_id: "c1".into(), text: "hello world".into() };
        assert_eq!(env.command().unwrap(), expected);

        let raw = r#"{"kind":"Reset","correlationToken":"t2"}"#;
        let env: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(env.command().unwrap(), Command::Reset);
    }

    #[test]
    fn rejects_unknown_kind_and_bad_payload() {
        let unknown =
            Envelope { kind: "Delete".into(), correlation_token: "t".into(), payload: Value::Null };
        assert!(matches!(unknown.command(), Err(ProtocolError::UnknownKind(k)) if k == "Delete"));

        let bad = Envelope {
            kind: KIND_SEARCH.into(),
            correlation_token: "t".into(),
            payload: serde_json::json!(42),
        };
        assert!(matches!(
            bad.command(),
            Err(ProtocolError::MalformedPayload { kind: "Search", .. })
        ));
    }

    #[test]
    fn replies_carry_kind_and_token() {
        let reply = Reply::SearchResults {
            correlation_token: "t9".into(),
            payload: vec![ScoredDoc { doc_id: "a".into(), score: 0.5, kind: MatchKind::Fuzzy }],
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["kind"], "SearchResults");
        assert_eq!(json["correlationToken"], "t9");
        assert_eq!(json["payload"][0]["docId"], "a");
        assert_eq!(json["payload"][0]["kind"], "fuzzy");
    }
}
