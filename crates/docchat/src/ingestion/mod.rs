//! Document ingestion: directory loading, cleaning, and chunking

mod chunker;
mod cleaner;
mod loader;

pub use chunker::TextChunker;
pub use cleaner::{clean_documents, clean_text};
pub use loader::DirectoryLoader;

use std::path::Path;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::Passage;

/// Full ingestion pipeline: load, clean in parallel, chunk, number chunks
pub struct IngestPipeline {
    loader: DirectoryLoader,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl IngestPipeline {
    /// Create a pipeline over a documents directory
    pub fn new(directory: &Path, chunking: &ChunkingConfig) -> Result<Self> {
        Ok(Self {
            loader: DirectoryLoader::new(directory)?,
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
        })
    }

    /// Load, clean, and chunk every document in the directory.
    ///
    /// Cleaning fans out across a worker pool; results are reassembled in
    /// source order before chunking, so chunk numbering is deterministic.
    pub async fn process_documents(&self) -> Result<Vec<Passage>> {
        let documents = self.loader.load()?;
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let cleaned = clean_documents(documents).await?;

        let chunker = TextChunker::new(self.chunk_size, self.chunk_overlap);
        let mut chunks = chunker.split_documents(&cleaned);

        for (i, chunk) in chunks.iter_mut().enumerate() {
            chunk
                .metadata
                .insert("chunk_id".to_string(), serde_json::json!(i + 1));
        }

        tracing::info!(
            "Processed {} documents into {} chunks",
            cleaned.len(),
            chunks.len()
        );

        Ok(chunks)
    }
}
