use crate::index::DocId;
use crate::record::ChunkRecord;
use crate::scorer::ScoredDoc;
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;

/// Persistence collaborator holding chunk records by id.
///
/// The search index never persists itself; it is rebuilt from `get_all` on startup.
pub trait ChunkStore: Send + Sync {
    /// Insert or overwrite records.
    fn put(&self, records: &[ChunkRecord]) -> Result<()>;
    /// Fetch records in the order of `ids`; unknown ids are skipped.
    fn get(&self, ids: &[DocId]) -> Result<Vec<ChunkRecord>>;
    fn get_all(&self) -> Result<Vec<ChunkRecord>>;
}

/// Pair ranked hits with their stored records, keeping ranking order.
pub fn resolve<S: ChunkStore + ?Sized>(
    store: &S,
    hits: &[ScoredDoc],
) -> Result<Vec<(ChunkRecord, f64)>> {
    let ids: Vec<DocId> = hits.iter().map(|h| h.doc_id.clone()).collect();
    let mut records: BTreeMap<DocId, ChunkRecord> =
        store.get(&ids)?.into_iter().map(|r| (r.id.clone(), r)).collect();
    Ok(hits
        .iter()
        .filter_map(|h| records.remove(&h.doc_id).map(|r| (r, h.score)))
        .collect())
}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<DocId, ChunkRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.records.read().len() }

    pub fn is_empty(&self) -> bool { self.records.read().is_empty() }
}

impl ChunkStore for MemoryStore {
    fn put(&self, records: &[ChunkRecord]) -> Result<()> {
        let mut map = self.records.write();
        for r in records {
            map.insert(r.id.clone(), r.clone());
        }
        Ok(())
    }

    fn get(&self, ids: &[DocId]) -> Result<Vec<ChunkRecord>> {
        let map = self.records.read();
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    fn get_all(&self) -> Result<Vec<ChunkRecord>> {
        Ok(self.records.read().values().cloned().collect())
    }
}

/// On-disk store backed by a sled tree; values are bincode-encoded records.
pub struct SledStore {
    db: sled::Db,
    chunks: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let db = sled::open(root.as_ref())?;
        let chunks = db.open_tree("chunks")?;
        Ok(Self { db, chunks })
    }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl ChunkStore for SledStore {
    fn put(&self, records: &[ChunkRecord]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for r in records {
            let bytes = bincode::serialize(r)?;
            batch.insert(r.id.as_bytes(), bytes);
        }
        self.chunks.apply_batch(batch)?;
        self.chunks.flush()?;
        Ok(())
    }

    fn get(&self, ids: &[DocId]) -> Result<Vec<ChunkRecord>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bytes) = self.chunks.get(id.as_bytes())? {
                out.push(bincode::deserialize(&bytes)?);
            }
        }
        Ok(out)
    }

    fn get_all(&self) -> Result<Vec<ChunkRecord>> {
        let mut out = Vec::new();
        for entry in self.chunks.iter() {
            let (_key, bytes) = entry?;
            out.push(bincode::deserialize(&bytes)?);
        }
        Ok(out)
    }
}
