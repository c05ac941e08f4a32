use crate::chunker::chunk_text;
use anyhow::{bail, Result};
use chunkdex::ChunkStore;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Paragraphs shorter than this are merged with their neighbour.
    pub min_words: usize,
    /// RFC 3339 timestamp stamped on every record.
    pub created_at: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub files: usize,
    pub chunks: usize,
}

/// A single file, or every `.txt`/`.md` file below a directory, in path order.
pub fn collect_sources(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input path {} does not exist", input.display());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("txt" | "md")))
        .collect();
    files.sort();
    Ok(files)
}

/// Chunk every source under `input` and write the records to `store`.
pub fn ingest_path(
    input: &Path,
    store: &dyn ChunkStore,
    options: &IngestOptions,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();
    for file in collect_sources(input)? {
        let text = match fs::read_to_string(&file) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let source_name = source_name(input, &file);
        let records = chunk_text(&source_name, &text, options.min_words, &options.created_at);
        store.put(&records)?;
        tracing::debug!(source = %source_name, chunks = records.len(), "ingested file");
        summary.files += 1;
        summary.chunks += records.len();
    }
    Ok(summary)
}

fn source_name(root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(root).ok().filter(|p| !p.as_os_str().is_empty());
    match rel {
        Some(rel) => rel.to_string_lossy().replace('\\', "/"),
        None => file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
    }
}
