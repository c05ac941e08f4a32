//! Ingestion side of chunkdex: turns text files into chunk records and stores them.

pub mod chunker;
pub mod ingest;
