//! Vector store provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Passage;

/// Trait for passage storage and similarity search.
///
/// Search results are ordered most-relevant-first; callers must not reorder
/// them.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Index a batch of passages
    async fn add_passages(&self, passages: &[Passage]) -> Result<()>;

    /// Similarity search returning the top `k` passages
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Passage>>;

    /// Diversity-aware search: fetch `fetch_k` candidates, select `k` by
    /// maximal marginal relevance
    async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
    ) -> Result<Vec<Passage>>;

    /// Number of passages in the collection
    async fn count(&self) -> Result<usize>;

    /// Drop and recreate the collection
    async fn reset(&self) -> Result<()>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
