//! Embedding backend trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generating text embeddings.
///
/// Constructors of implementations must fail fast on a missing credential or
/// an unsupported model identifier; those failures are never retried.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for a batch of texts
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single query text
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_documents(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| crate::error::Error::embedding("Backend returned no embedding"))
    }

    /// Get backend name for logging
    fn name(&self) -> &str;
}
