use anyhow::Result;
use chunkdex::{resolve, ChunkStore, EngineConfig, EngineError, EngineHandle, Envelope, SledStore};
use chunkdex_indexer::ingest::{ingest_path, IngestOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "chunkdex")]
#[command(
    about = "Ingest text into paragraph chunks and search them with an in-process TF-IDF engine",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split .txt/.md files into chunks and store them
    Ingest {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Chunk store directory
        #[arg(long, default_value = "./chunks")]
        store: PathBuf,
        /// Merge paragraphs shorter than this many words into the next one
        #[arg(long, default_value_t = 20)]
        min_words: usize,
    },
    /// Rebuild the index from the store and run one query
    Search {
        /// Chunk store directory
        #[arg(long, default_value = "./chunks")]
        store: PathBuf,
        /// Free-text query
        #[arg(long)]
        query: String,
        /// Maximum number of hits to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Forward JSON envelopes from stdin to the search worker, one reply per line on stdout
    Pipe {
        /// Replay this chunk store into the index before reading stdin
        #[arg(long)]
        store: Option<PathBuf>,
        /// Seconds to wait for each reply; malformed commands never get one
        #[arg(long, default_value_t = 5)]
        reply_timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { input, store, min_words } => ingest(input, store, min_words),
        Commands::Search { store, query, limit } => search(store, query, limit).await,
        Commands::Pipe { store, reply_timeout_secs } => pipe(store, reply_timeout_secs).await,
    }
}

fn ingest(input: PathBuf, store_dir: PathBuf, min_words: usize) -> Result<()> {
    let store = SledStore::open(&store_dir)?;
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let options = IngestOptions { min_words, created_at };
    let summary = ingest_path(&input, &store, &options)?;
    store.flush()?;
    tracing::info!(
        files = summary.files,
        chunks = summary.chunks,
        total = store.len(),
        store = %store_dir.display(),
        "ingest complete"
    );
    Ok(())
}

async fn search(store_dir: PathBuf, query: String, limit: usize) -> Result<()> {
    let store = Arc::new(SledStore::open(&store_dir)?);
    let engine = EngineHandle::start(EngineConfig::default());
    let replayed = engine.replay(store.clone()).await??;
    tracing::info!(replayed, "index rebuilt");

    let mut hits = engine.search(query.as_str()).await?;
    hits.truncate(limit);
    for (record, score) in resolve(store.as_ref(), &hits)? {
        let line = serde_json::json!({
            "docId": record.id,
            "score": score,
            "sourceName": record.source_name,
            "wordCount": record.word_count,
            "text": record.text,
        });
        println!("{line}");
    }
    Ok(())
}

async fn pipe(store_dir: Option<PathBuf>, reply_timeout_secs: u64) -> Result<()> {
    let config = EngineConfig {
        reply_timeout: Some(Duration::from_secs(reply_timeout_secs)),
        ..EngineConfig::default()
    };
    let engine = EngineHandle::start(config);
    if let Some(dir) = store_dir {
        let store: Arc<dyn ChunkStore> = Arc::new(SledStore::open(&dir)?);
        // Serve stdin immediately; early searches see a partial index.
        let replay = engine.replay(store);
        tokio::spawn(async move {
            match replay.await {
                Ok(Ok(n)) => tracing::info!(records = n, "background replay finished"),
                Ok(Err(e)) => tracing::error!(error = %e, "background replay failed"),
                Err(e) => tracing::error!(error = %e, "background replay task aborted"),
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let envelope: Envelope = match serde_json::from_str(&line) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "skipping line that is not an envelope");
                continue;
            }
        };
        // Enqueue in input order; replies are collected concurrently.
        let pending = match engine.submit(envelope).await {
            Ok(pending) => pending,
            Err(EngineError::DuplicateToken(token)) => {
                tracing::warn!(%token, "skipping envelope whose token is still in flight");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        in_flight.spawn(async move {
            let token = pending.token().to_string();
            match pending.wait().await {
                Ok(reply) => match serde_json::to_string(&reply) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::error!(error = %e, "failed to encode reply"),
                },
                Err(e) => tracing::warn!(%token, error = %e, "no reply"),
            }
        });
    }
    while in_flight.join_next().await.is_some() {}
    Ok(())
}
