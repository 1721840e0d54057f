use crate::types::Chunk;
use std::collections::HashMap;

/// Chunks grouped by owning file, each bucket in `chunk_index` order
#[derive(Debug, Clone, Default)]
pub struct ChunkIndex {
    by_file: HashMap<String, Vec<Chunk>>,
}

impl ChunkIndex {
    /// Group `chunks` by filename
    pub fn build(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        let mut by_file: HashMap<String, Vec<Chunk>> = HashMap::new();
        for chunk in chunks {
            by_file
                .entry(chunk.metadata.filename.clone())
                .or_default()
                .push(chunk);
        }

        for bucket in by_file.values_mut() {
            bucket.sort_by_key(Chunk::index);
        }

        Self { by_file }
    }

    /// Ordered chunks of `filename`; empty when the file has none
    pub fn get(&self, filename: &str) -> &[Chunk] {
        self.by_file.get(filename).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of files with at least one chunk
    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    /// Total number of chunks across all files
    pub fn chunk_count(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }
}

impl FromIterator<Chunk> for ChunkIndex {
    fn from_iter<I: IntoIterator<Item = Chunk>>(iter: I) -> Self {
        Self::build(iter)
    }
}
