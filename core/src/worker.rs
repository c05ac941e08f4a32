//! Single-writer command loop that owns the inverted index.
//!
//! All index mutations and queries arrive as [`Envelope`]s on one channel and are
//! processed strictly one at a time, so a search never observes a half-applied
//! insertion. Each well-formed command yields exactly one [`Reply`] carrying the
//! same correlation token on a separate reply channel. Malformed envelopes and
//! commands that panic are logged and produce no reply.

use crate::error::IndexError;
use crate::index::InvertedIndex;
use crate::protocol::{Command, CorrelationToken, Envelope, Reply};
use crate::scorer::search;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type Handler = fn(&mut InvertedIndex, CorrelationToken, Command) -> Reply;

pub struct SearchWorker {
    index: InvertedIndex,
    commands: mpsc::Receiver<Envelope>,
    replies: mpsc::Sender<Reply>,
    handler: Handler,
}

impl SearchWorker {
    /// The index starts empty; it is filled by replaying `Index` commands.
    pub fn new(commands: mpsc::Receiver<Envelope>, replies: mpsc::Sender<Reply>) -> Self {
        Self { index: InvertedIndex::new(), commands, replies, handler: execute }
    }

    #[cfg(test)]
    fn with_handler(
        commands: mpsc::Receiver<Envelope>,
        replies: mpsc::Sender<Reply>,
        handler: Handler,
    ) -> Self {
        Self { handler, ..Self::new(commands, replies) }
    }

    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(
        commands: mpsc::Receiver<Envelope>,
        replies: mpsc::Sender<Reply>,
    ) -> JoinHandle<()> {
        let worker = Self::new(commands, replies);
        tokio::spawn(worker.run())
    }

    /// Process commands until the inbox closes or nobody listens for replies.
    pub async fn run(mut self) {
        tracing::info!("search worker started");
        while let Some(envelope) = self.commands.recv().await {
            let Some(reply) = self.process(envelope) else { continue };
            if self.replies.send(reply).await.is_err() {
                tracing::warn!("reply channel closed, stopping search worker");
                break;
            }
        }
        tracing::info!(num_docs = self.index.num_docs(), "search worker stopped");
    }

    fn process(&mut self, envelope: Envelope) -> Option<Reply> {
        let command = match envelope.command() {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(
                    token = %envelope.correlation_token,
                    kind = %envelope.kind,
                    error = %e,
                    "dropping malformed command"
                );
                return None;
            }
        };
        let kind = command.kind();
        let token = envelope.correlation_token;
        let handler = self.handler;
        let index = &mut self.index;
        isolate(kind, || handler(index, token, command))
    }
}

/// Apply one decoded command to the index and build its reply.
pub fn execute(index: &mut InvertedIndex, token: CorrelationToken, command: Command) -> Reply {
    match command {
        Command::Index { doc_id, text } => {
            match index.index_document(&doc_id, &text) {
                Ok(()) => {
                    tracing::trace!(%doc_id, num_docs = index.num_docs(), "indexed document")
                }
                Err(IndexError::AlreadyIndexed(_)) => {
                    tracing::debug!(%doc_id, "document already indexed, skipping")
                }
            }
            Reply::IndexComplete { correlation_token: token }
        }
        Command::Search { query } => {
            let results = search(index, &query);
            tracing::debug!(%query, hits = results.len(), "search complete");
            Reply::SearchResults { correlation_token: token, payload: results }
        }
        Command::Reset => {
            index.reset();
            tracing::info!("index reset");
            Reply::ResetComplete { correlation_token: token }
        }
    }
}

/// Run `f`, turning a panic into a logged `None` so the worker outlives a bad command.
pub(crate) fn isolate<R>(kind: &str, f: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let panic = panic_message(payload.as_ref());
            tracing::error!(kind, panic, "command panicked, no reply sent");
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::KIND_SEARCH;

    #[test]
    fn isolate_swallows_panics() {
        let out: Option<u32> = isolate("test", || panic!("boom"));
        assert!(out.is_none());
        assert_eq!(isolate("test", || 7), Some(7));
    }

    #[test]
    fn execute_replies_with_same_token() {
        let mut idx = InvertedIndex::new();
        let insert = Command::Index { doc_id: "a".into(), text: "ownership borrowing".into() };
        let reply = execute(&mut idx, "t1".into(), insert);
        assert_eq!(reply, Reply::IndexComplete { correlation_token: "t1".into() });

        // re-indexing is acknowledged the same way
        let again = Command::Index { doc_id: "a".into(), text: "other".into() };
        let reply = execute(&mut idx, "t2".into(), again);
        assert_eq!(reply.correlation_token(), "t2");
        assert_eq!(idx.num_docs(), 1);

        match execute(&mut idx, "t3".into(), Command::Search { query: "borrowing".into() }) {
            Reply::SearchResults { correlation_token, payload } => {
                assert_eq!(correlation_token, "t3");
                assert_eq!(payload.len(), 1);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_commands_get_no_reply() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (reply_tx, mut reply_rx) = mpsc::channel(8);
        let handle = SearchWorker::spawn(cmd_rx, reply_tx);

        let unknown = Envelope {
            kind: "Compact".into(),
            correlation_token: "bad".into(),
            payload: serde_json::Value::Null,
        };
        let bad_payload = Envelope {
            kind: KIND_SEARCH.into(),
            correlation_token: "bad2".into(),
            payload: serde_json::json!({"q": 1}),
        };
        cmd_tx.send(unknown).await.unwrap();
        cmd_tx.send(bad_payload).await.unwrap();
        cmd_tx.send(Command::Reset.into_envelope("ok".into())).await.unwrap();
        drop(cmd_tx);

        let first = reply_rx.recv().await.unwrap();
        assert_eq!(first, Reply::ResetComplete { correlation_token: "ok".into() });
        assert!(reply_rx.recv().await.is_none());
        handle.await.unwrap();
    }

    fn explode_on_search(
        index: &mut InvertedIndex,
        token: CorrelationToken,
        command: Command,
    ) -> Reply {
        if let Command::Search { query } = &command {
            if query == "explode" {
                panic!("handler blew up");
            }
        }
        execute(index, token, command)
    }

    #[tokio::test]
    async fn loop_keeps_serving_after_a_command_panics() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (reply_tx, mut reply_rx) = mpsc::channel(8);
        let worker = SearchWorker::with_handler(cmd_rx, reply_tx, explode_on_search);
        let handle = tokio::spawn(worker.run());

        let insert = Command::Index { doc_id: "a".into(), text: "ownership borrowing".into() };
        cmd_tx.send(insert.into_envelope("i1".into())).await.unwrap();
        let boom = Command::Search { query: "explode".into() };
        cmd_tx.send(boom.into_envelope("boom".into())).await.unwrap();
        let after = Command::Search { query: "borrowing".into() };
        cmd_tx.send(after.into_envelope("s1".into())).await.unwrap();
        drop(cmd_tx);

        let first = reply_rx.recv().await.unwrap();
        assert_eq!(first, Reply::IndexComplete { correlation_token: "i1".into() });

        // the panicking search is skipped; the index built before it is still there
        match reply_rx.recv().await.unwrap() {
            Reply::SearchResults { correlation_token, payload } => {
                assert_eq!(correlation_token, "s1");
                assert_eq!(payload.len(), 1);
                assert_eq!(payload[0].doc_id, "a");
            }
            other => panic!("unexpected reply {other:?}"),
        }
        assert!(reply_rx.recv().await.is_none());
        handle.await.unwrap();
    }
}
