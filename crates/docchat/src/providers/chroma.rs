//! Chroma vector store client
//!
//! Talks to a Chroma server over its REST API. Embeddings are computed
//! client-side through the injected embedding backend, so the store itself
//! only ever sees vectors.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::types::Passage;

use super::embedding::EmbeddingBackend;
use super::vector_store::VectorStoreProvider;

/// Trade-off between relevance and diversity for MMR selection
const MMR_LAMBDA: f32 = 0.5;

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Serialize)]
struct UpsertRequest {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    documents: Vec<String>,
    metadatas: Vec<HashMap<String, serde_json::Value>>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: Vec<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    documents: Option<Vec<Vec<Option<String>>>>,
    metadatas: Option<Vec<Vec<Option<HashMap<String, serde_json::Value>>>>>,
    embeddings: Option<Vec<Vec<Vec<f32>>>>,
}

/// Chroma-backed vector store
pub struct ChromaStore {
    client: Client,
    config: VectorDbConfig,
    embedder: Arc<dyn EmbeddingBackend>,
    collection_id: RwLock<String>,
}

impl ChromaStore {
    /// Connect to the Chroma server, creating the collection if needed
    pub async fn connect(
        config: &VectorDbConfig,
        embedder: Arc<dyn EmbeddingBackend>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        let collection_id =
            Self::get_or_create_collection(&client, &config.base_url, &config.collection).await?;

        tracing::info!(
            collection = %config.collection,
            "Connected to Chroma at {}",
            config.base_url
        );

        Ok(Self {
            client,
            config: config.clone(),
            embedder,
            collection_id: RwLock::new(collection_id),
        })
    }

    async fn get_or_create_collection(
        client: &Client,
        base_url: &str,
        name: &str,
    ) -> Result<String> {
        let url = format!("{}/api/v1/collections", base_url);
        let request = CreateCollectionRequest {
            name,
            get_or_create: true,
        };

        let response = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_store(format!("Collection request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_store(format!(
                "Collection creation failed: HTTP {} - {}",
                status, body
            )));
        }

        let info: CollectionInfo = response
            .json()
            .await
            .map_err(|e| Error::vector_store(format!("Invalid collection response: {}", e)))?;

        Ok(info.id)
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{}",
            self.config.base_url,
            self.collection_id.read(),
            suffix
        )
    }

    async fn query_collection(
        &self,
        query_embedding: Vec<f32>,
        n_results: usize,
        include_embeddings: bool,
    ) -> Result<QueryResponse> {
        let mut include = vec!["documents", "metadatas", "distances"];
        if include_embeddings {
            include.push("embeddings");
        }

        let request = QueryRequest {
            query_embeddings: vec![query_embedding],
            n_results,
            include,
        };

        let response = self
            .client
            .post(self.collection_url("query"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_store(format!("Query request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_store(format!(
                "Query failed: HTTP {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::vector_store(format!("Invalid query response: {}", e)))
    }

    /// Flatten the first result row of a query response into passages,
    /// preserving the server's relevance order.
    fn response_passages(response: QueryResponse) -> Vec<Passage> {
        let documents = response
            .documents
            .and_then(|mut rows| if rows.is_empty() { None } else { Some(rows.remove(0)) })
            .unwrap_or_default();
        let mut metadatas = response
            .metadatas
            .and_then(|mut rows| if rows.is_empty() { None } else { Some(rows.remove(0)) })
            .unwrap_or_default();

        documents
            .into_iter()
            .enumerate()
            .filter_map(|(i, content)| {
                let content = content?;
                let metadata = metadatas
                    .get_mut(i)
                    .and_then(|m| m.take())
                    .unwrap_or_default();
                Some(Passage { content, metadata })
            })
            .collect()
    }
}

#[async_trait]
impl VectorStoreProvider for ChromaStore {
    async fn add_passages(&self, passages: &[Passage]) -> Result<()> {
        if passages.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;

        let request = UpsertRequest {
            ids: (0..passages.len()).map(|i| format!("doc_{}", i)).collect(),
            embeddings,
            documents: texts,
            metadatas: passages.iter().map(|p| p.metadata.clone()).collect(),
        };

        let response = self
            .client
            .post(self.collection_url("upsert"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_store(format!("Upsert request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_store(format!(
                "Upsert failed: HTTP {} - {}",
                status, body
            )));
        }

        tracing::info!("Stored {} passages", passages.len());
        Ok(())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        let query_embedding = self.embedder.embed_query(query).await?;
        let response = self.query_collection(query_embedding, k, false).await?;
        Ok(Self::response_passages(response))
    }

    async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
    ) -> Result<Vec<Passage>> {
        let query_embedding = self.embedder.embed_query(query).await?;
        let response = self
            .query_collection(query_embedding.clone(), fetch_k, true)
            .await?;

        let candidate_embeddings = response
            .embeddings
            .as_ref()
            .and_then(|rows| rows.first())
            .cloned()
            .unwrap_or_default();

        let passages = Self::response_passages(response);
        if candidate_embeddings.len() != passages.len() {
            // Server did not return embeddings; fall back to relevance order
            return Ok(passages.into_iter().take(k).collect());
        }

        let selected =
            maximal_marginal_relevance(&query_embedding, &candidate_embeddings, MMR_LAMBDA, k);

        let mut passages: Vec<Option<Passage>> = passages.into_iter().map(Some).collect();
        Ok(selected
            .into_iter()
            .filter_map(|i| passages[i].take())
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        let response = self
            .client
            .get(self.collection_url("count"))
            .send()
            .await
            .map_err(|e| Error::vector_store(format!("Count request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::vector_store(format!(
                "Count failed: HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::vector_store(format!("Invalid count response: {}", e)))
    }

    async fn reset(&self) -> Result<()> {
        let url = format!(
            "{}/api/v1/collections/{}",
            self.config.base_url, self.config.collection
        );

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| Error::vector_store(format!("Delete request failed: {}", e)))?;

        // A missing collection is fine; anything else is not
        if !response.status().is_success() && response.status().as_u16() != 404 {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_store(format!(
                "Collection delete failed: HTTP {} - {}",
                status, body
            )));
        }

        let new_id = Self::get_or_create_collection(
            &self.client,
            &self.config.base_url,
            &self.config.collection,
        )
        .await?;
        *self.collection_id.write() = new_id;

        Ok(())
    }

    fn name(&self) -> &str {
        "chroma"
    }
}

/// Cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Greedy maximal-marginal-relevance selection.
///
/// Returns indices into `candidates`, balancing similarity to the query
/// against similarity to already-selected candidates.
fn maximal_marginal_relevance(
    query: &[f32],
    candidates: &[Vec<f32>],
    lambda: f32,
    k: usize,
) -> Vec<usize> {
    let mut selected: Vec<usize> = Vec::new();
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();

    while selected.len() < k && !remaining.is_empty() {
        let mut best_index = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (position, &candidate) in remaining.iter().enumerate() {
            let relevance = cosine_similarity(query, &candidates[candidate]);
            let redundancy = selected
                .iter()
                .map(|&s| cosine_similarity(&candidates[candidate], &candidates[s]))
                .fold(0.0f32, f32::max);

            let score = lambda * relevance - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best_index = position;
            }
        }

        selected.push(remaining.swap_remove(best_index));
    }

    selected
}
