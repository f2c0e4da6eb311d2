//! Retrieval-answer orchestration

use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::generation::AnswerGenerator;
use crate::providers::VectorStoreProvider;
use crate::types::{Passage, QueryResult};

/// Basic statistics about the indexed collection
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    pub document_count: usize,
}

/// Orchestrates retrieval and answer generation for a single query.
///
/// Stateless over its injected collaborators: concurrent `process_query`
/// calls need no coordination. Retrieval failures propagate to the caller as
/// hard errors; generation failures surface as whatever string the answer
/// generator produced.
pub struct RagPipeline {
    store: Arc<dyn VectorStoreProvider>,
    generator: AnswerGenerator,
    retrieval_k: usize,
}

impl RagPipeline {
    /// Create a new pipeline
    pub fn new(
        store: Arc<dyn VectorStoreProvider>,
        generator: AnswerGenerator,
        retrieval_k: usize,
    ) -> Self {
        Self {
            store,
            generator,
            retrieval_k,
        }
    }

    /// Retrieve the top-k passages for a query, most relevant first
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Passage>> {
        self.store.similarity_search(query, self.retrieval_k).await
    }

    /// Process a query through the full retrieval-generation pipeline
    pub async fn process_query(&self, query: &str) -> Result<QueryResult> {
        let passages = self.retrieve(query).await?;

        let sources = dedup_sources(&passages);

        let answer = self.generator.generate(query, &passages).await;

        Ok(QueryResult {
            query: query.to_string(),
            answer,
            retrieved_count: passages.len(),
            sources,
            passages,
        })
    }

    /// Basic statistics about the vector store collection
    pub async fn collection_stats(&self) -> Result<CollectionStats> {
        Ok(CollectionStats {
            document_count: self.store.count().await?,
        })
    }
}

/// Collect distinct `source` metadata values, first occurrence wins
fn dedup_sources(passages: &[Passage]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for passage in passages {
        if let Some(source) = passage.source() {
            if !sources.iter().any(|s| s == source) {
                sources.push(source.to_string());
            }
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_sources_first_seen_order() {
        let passages = vec![
            Passage::with_source("1", "a"),
            Passage::with_source("2", "b"),
            Passage::with_source("3", "a"),
            Passage::with_source("4", "c"),
        ];
        assert_eq!(dedup_sources(&passages), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedup_sources_skips_missing() {
        let passages = vec![
            Passage::new("no source"),
            Passage::with_source("2", "a"),
        ];
        assert_eq!(dedup_sources(&passages), vec!["a"]);
    }
}
