//! Application state for the HTTP server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::generation::AnswerGenerator;
use crate::ingestion::IngestPipeline;
use crate::math::MathAgent;
use crate::pipeline::RagPipeline;
use crate::prompts::PromptRegistry;
use crate::providers::{
    ChromaStore, EmbeddingBackend, GenerationBackend, OpenAiChat, OpenAiEmbeddings,
    VectorStoreProvider,
};

/// Shared application state.
///
/// The RAG pipeline handle is caller-owned and swapped atomically: every
/// document-set mutation builds a fresh immutable pipeline instance, so
/// in-flight queries keep working against the instance they cloned.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    registry: PromptRegistry,
    math_agent: MathAgent,
    pipeline: RwLock<Option<Arc<RagPipeline>>>,
}

impl AppState {
    /// Create new application state, indexing any pre-existing documents
    pub async fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        std::fs::create_dir_all(&config.storage.docs_directory)?;

        let registry = PromptRegistry::default();

        let chat: Arc<dyn GenerationBackend> = Arc::new(OpenAiChat::new(&config.llm)?);
        let math_agent = MathAgent::new(Arc::clone(&chat), &registry)?;

        let state = Self {
            inner: Arc::new(AppStateInner {
                config,
                registry,
                math_agent,
                pipeline: RwLock::new(None),
            }),
        };

        if state.has_documents() {
            tracing::info!("Found existing documents, building pipeline");
            state.rebuild_pipeline().await?;
        }

        Ok(state)
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the math agent
    pub fn math_agent(&self) -> &MathAgent {
        &self.inner.math_agent
    }

    /// Clone the current pipeline handle, if one has been built
    pub fn pipeline(&self) -> Option<Arc<RagPipeline>> {
        self.inner.pipeline.read().clone()
    }

    /// Drop the current pipeline (after the last document is deleted)
    pub fn clear_pipeline(&self) {
        *self.inner.pipeline.write() = None;
    }

    /// Whether any documents exist in the docs directory
    pub fn has_documents(&self) -> bool {
        std::fs::read_dir(&self.inner.config.storage.docs_directory)
            .map(|mut entries| entries.any(|e| e.is_ok()))
            .unwrap_or(false)
    }

    /// List uploaded document filenames
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let mut documents: Vec<String> =
            std::fs::read_dir(&self.inner.config.storage.docs_directory)?
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect();
        documents.sort();
        Ok(documents)
    }

    /// Path of an uploaded document inside the docs directory
    pub fn document_path(&self, filename: &str) -> std::path::PathBuf {
        self.inner.config.storage.docs_directory.join(filename)
    }

    /// Rebuild the RAG pipeline from the current document set and swap it in.
    ///
    /// The vector collection is reset and re-indexed, so deletions do not
    /// leave stale passages behind.
    pub async fn rebuild_pipeline(&self) -> Result<()> {
        let config = &self.inner.config;

        let ingest = IngestPipeline::new(&config.storage.docs_directory, &config.chunking)?;
        let chunks = ingest.process_documents().await?;

        let embedder: Arc<dyn EmbeddingBackend> =
            Arc::new(OpenAiEmbeddings::new(&config.embeddings)?);
        let store = ChromaStore::connect(&config.vector_db, embedder).await?;
        store.reset().await?;
        store.add_passages(&chunks).await?;

        let chat: Arc<dyn GenerationBackend> = Arc::new(OpenAiChat::new(&config.llm)?);
        let generator = AnswerGenerator::new(chat, &self.inner.registry)?;

        let pipeline = RagPipeline::new(Arc::new(store), generator, config.retrieval.top_k);

        *self.inner.pipeline.write() = Some(Arc::new(pipeline));
        tracing::info!("Pipeline rebuilt over {} chunks", chunks.len());

        Ok(())
    }
}
