//! Caller side of the worker protocol.
//!
//! [`EngineHandle`] owns the command sender and a table of one-shot listeners keyed by
//! correlation token. A dispatcher task routes each reply to its listener and drops
//! replies nobody is waiting for, so many requests can be in flight over one channel.

use crate::error::{EngineError, Result};
use crate::index::DocId;
use crate::protocol::{Command, CorrelationToken, Envelope, Reply};
use crate::scorer::ScoredDoc;
use crate::store::ChunkStore;
use crate::worker::SearchWorker;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

type Listeners = Arc<Mutex<HashMap<CorrelationToken, oneshot::Sender<Reply>>>>;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of the command channel into the worker.
    pub command_buffer: usize,
    /// Capacity of the reply channel out of the worker.
    pub reply_buffer: usize,
    /// Give up on a reply after this long. `None` waits indefinitely.
    pub reply_timeout: Option<Duration>,
    /// Delay applied by [`EngineHandle::search_latest`] before sending.
    pub debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_buffer: 1024,
            reply_buffer: 1024,
            reply_timeout: None,
            debounce: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Envelope>,
    listeners: Listeners,
    generation: Arc<AtomicU64>,
    config: EngineConfig,
}

impl EngineHandle {
    /// Build an empty worker and its reply dispatcher on the current tokio runtime.
    pub fn start(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer.max(1));
        let (reply_tx, reply_rx) = mpsc::channel(config.reply_buffer.max(1));
        SearchWorker::spawn(cmd_rx, reply_tx);

        let listeners: Listeners = Arc::default();
        tokio::spawn(dispatch_replies(reply_rx, listeners.clone()));
        tracing::debug!(?config, "search engine started");

        Self {
            commands: cmd_tx,
            listeners,
            generation: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Register a listener for the envelope's correlation token and enqueue it.
    ///
    /// Commands reach the worker in the order `submit` calls complete, so a caller
    /// can pipeline several commands and await the replies later. A token that is
    /// still awaiting its reply is refused with [`EngineError::DuplicateToken`] and
    /// the envelope is not sent.
    pub async fn submit(&self, envelope: Envelope) -> Result<PendingReply> {
        let token = envelope.correlation_token.clone();
        let (tx, rx) = oneshot::channel();
        match self.listeners.lock().entry(token.clone()) {
            Entry::Occupied(_) => return Err(EngineError::DuplicateToken(token)),
            Entry::Vacant(slot) => {
                slot.insert(tx);
            }
        }

        if self.commands.send(envelope).await.is_err() {
            self.listeners.lock().remove(&token);
            return Err(EngineError::WorkerClosed);
        }
        Ok(PendingReply {
            token,
            rx,
            listeners: self.listeners.clone(),
            timeout: self.config.reply_timeout,
        })
    }

    /// Send a raw envelope and wait for the reply carrying its correlation token.
    ///
    /// The worker sends no reply for envelopes it cannot decode or for commands that
    /// panic. Without a configured `reply_timeout` such a request waits forever and its
    /// listener stays registered, so callers forwarding untrusted envelopes should set one.
    pub async fn request_envelope(&self, envelope: Envelope) -> Result<Reply> {
        self.submit(envelope).await?.wait().await
    }

    pub async fn request(&self, command: Command) -> Result<Reply> {
        let token = Uuid::new_v4().to_string();
        self.request_envelope(command.into_envelope(token)).await
    }

    pub async fn index(&self, doc_id: impl Into<DocId>, text: impl Into<String>) -> Result<()> {
        let command = Command::Index { doc_id: doc_id.into(), text: text.into() };
        match self.request(command).await? {
            Reply::IndexComplete { .. } => Ok(()),
            other => Err(EngineError::UnexpectedReply {
                expected: "IndexComplete",
                got: other.kind(),
            }),
        }
    }

    pub async fn search(&self, query: impl Into<String>) -> Result<Vec<ScoredDoc>> {
        match self.request(Command::Search { query: query.into() }).await? {
            Reply::SearchResults { payload, .. } => Ok(payload),
            other => Err(EngineError::UnexpectedReply {
                expected: "SearchResults",
                got: other.kind(),
            }),
        }
    }

    pub async fn reset(&self) -> Result<()> {
        match self.request(Command::Reset).await? {
            Reply::ResetComplete { .. } => Ok(()),
            other => Err(EngineError::UnexpectedReply {
                expected: "ResetComplete",
                got: other.kind(),
            }),
        }
    }

    /// Search that yields to newer calls, for search-as-you-type callers.
    ///
    /// Every call takes a new generation. Returns `Ok(None)` when a later call started
    /// before this one's reply arrived (or during the debounce delay, in which case the
    /// query is never sent). The worker still runs superseded queries already sent.
    pub async fn search_latest(
        &self,
        query: impl Into<String>,
    ) -> Result<Option<Vec<ScoredDoc>>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.config.debounce.is_zero() {
            tokio::time::sleep(self.config.debounce).await;
            if self.generation.load(Ordering::SeqCst) != generation {
                return Ok(None);
            }
        }

        let hits = self.search(query).await?;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding superseded search results");
            return Ok(None);
        }
        Ok(Some(hits))
    }

    /// Feed every stored record to the worker as an `Index` command.
    ///
    /// Runs in the background; searches issued meanwhile see a partially replayed
    /// index. Await the handle to learn how many records were sent.
    pub fn replay(&self, store: Arc<dyn ChunkStore>) -> JoinHandle<anyhow::Result<usize>> {
        let handle = self.clone();
        tokio::spawn(async move {
            let records = tokio::task::spawn_blocking(move || store.get_all()).await??;
            let total = records.len();
            for record in records {
                handle.index(record.id, record.text).await?;
            }
            tracing::info!(records = total, "replay complete");
            Ok(total)
        })
    }
}

/// A submitted command whose reply has not been collected yet.
pub struct PendingReply {
    token: CorrelationToken,
    rx: oneshot::Receiver<Reply>,
    listeners: Listeners,
    timeout: Option<Duration>,
}

impl PendingReply {
    pub fn token(&self) -> &str { &self.token }

    pub async fn wait(self) -> Result<Reply> {
        let PendingReply { token, rx, listeners, timeout } = self;
        let received = match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, rx).await {
                Ok(received) => received,
                Err(_) => {
                    listeners.lock().remove(&token);
                    return Err(EngineError::Timeout { token, timeout });
                }
            },
            None => rx.await,
        };
        received.map_err(|_| EngineError::ReplyDropped(token))
    }
}

async fn dispatch_replies(mut replies: mpsc::Receiver<Reply>, listeners: Listeners) {
    while let Some(reply) = replies.recv().await {
        let listener = listeners.lock().remove(reply.correlation_token());
        match listener {
            Some(tx) => {
                if tx.send(reply).is_err() {
                    tracing::trace!("listener went away before its reply arrived");
                }
            }
            None => tracing::debug!(
                token = reply.correlation_token(),
                kind = reply.kind(),
                "discarding reply with no listener"
            ),
        }
    }
    // Worker is gone; fail everyone still waiting.
    listeners.lock().clear();
}
