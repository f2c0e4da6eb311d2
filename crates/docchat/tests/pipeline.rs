//! Integration tests for the retrieval-answer pipeline with mock backends

use async_trait::async_trait;
use std::sync::Arc;

use docchat::error::{Error, Result};
use docchat::generation::AnswerGenerator;
use docchat::math::MathAgent;
use docchat::pipeline::RagPipeline;
use docchat::prompts::PromptRegistry;
use docchat::providers::{GenerationBackend, GenerationReply, VectorStoreProvider};
use docchat::types::Passage;

/// Store that returns a fixed passage list
struct StaticStore {
    passages: Vec<Passage>,
}

#[async_trait]
impl VectorStoreProvider for StaticStore {
    async fn add_passages(&self, _passages: &[Passage]) -> Result<()> {
        Ok(())
    }

    async fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<Passage>> {
        Ok(self.passages.iter().take(k).cloned().collect())
    }

    async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        _fetch_k: usize,
    ) -> Result<Vec<Passage>> {
        self.similarity_search(query, k).await
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.passages.len())
    }

    async fn reset(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Store whose search always fails, as if the backend were unreachable
struct FailingStore;

#[async_trait]
impl VectorStoreProvider for FailingStore {
    async fn add_passages(&self, _passages: &[Passage]) -> Result<()> {
        Ok(())
    }

    async fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<Passage>> {
        Err(Error::vector_store("connection refused"))
    }

    async fn max_marginal_relevance_search(
        &self,
        _query: &str,
        _k: usize,
        _fetch_k: usize,
    ) -> Result<Vec<Passage>> {
        Err(Error::vector_store("connection refused"))
    }

    async fn count(&self) -> Result<usize> {
        Err(Error::vector_store("connection refused"))
    }

    async fn reset(&self) -> Result<()> {
        Err(Error::vector_store("connection refused"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Backend that echoes the prompt back, marking it as an answer
struct EchoBackend;

#[async_trait]
impl GenerationBackend for EchoBackend {
    async fn invoke(&self, prompt: &str) -> Result<GenerationReply> {
        Ok(GenerationReply::Plain(format!("ANSWER: {}", prompt)))
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }
}

/// Backend that always fails, as if the service were down
struct FailingBackend;

#[async_trait]
impl GenerationBackend for FailingBackend {
    async fn invoke(&self, _prompt: &str) -> Result<GenerationReply> {
        Err(Error::llm("backend offline"))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "failing-1"
    }
}

fn passages_with_sources(sources: &[&str]) -> Vec<Passage> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| Passage::with_source(format!("passage {}", i), *source))
        .collect()
}

fn make_pipeline(
    store: Arc<dyn VectorStoreProvider>,
    backend: Arc<dyn GenerationBackend>,
    top_k: usize,
) -> RagPipeline {
    let registry = PromptRegistry::default();
    let generator = AnswerGenerator::new(backend, &registry).unwrap();
    RagPipeline::new(store, generator, top_k)
}

#[tokio::test]
async fn test_process_query_dedups_sources_in_first_seen_order() {
    let store = Arc::new(StaticStore {
        passages: passages_with_sources(&["a", "b", "a", "c"]),
    });
    let pipeline = make_pipeline(store, Arc::new(EchoBackend), 4);

    let result = pipeline.process_query("what do the documents say?").await.unwrap();

    assert_eq!(result.sources, vec!["a", "b", "c"]);
    // The passage list itself is not deduplicated or reordered
    assert_eq!(result.retrieved_count, 4);
    let passage_sources: Vec<_> = result
        .passages
        .iter()
        .map(|p| p.source().unwrap())
        .collect();
    assert_eq!(passage_sources, vec!["a", "b", "a", "c"]);
}

#[tokio::test]
async fn test_answer_includes_context_and_question() {
    let store = Arc::new(StaticStore {
        passages: vec![Passage::with_source("the sky is blue", "weather.txt")],
    });
    let pipeline = make_pipeline(store, Arc::new(EchoBackend), 4);

    let result = pipeline.process_query("what color is the sky?").await.unwrap();

    assert!(result.answer.starts_with("ANSWER:"));
    assert!(result.answer.contains("the sky is blue"));
    assert!(result.answer.contains("what color is the sky?"));
}

#[tokio::test]
async fn test_generation_failure_degrades_to_string() {
    let store = Arc::new(StaticStore {
        passages: passages_with_sources(&["a"]),
    });
    let pipeline = make_pipeline(store, Arc::new(FailingBackend), 4);

    let result = pipeline.process_query("anything").await.unwrap();

    assert!(result.answer.contains("Failed to generate an answer"));
    assert!(result.answer.contains("backend offline"));
}

#[tokio::test]
async fn test_retrieval_failure_propagates_as_hard_error() {
    let pipeline = make_pipeline(Arc::new(FailingStore), Arc::new(EchoBackend), 4);

    let result = pipeline.process_query("anything").await;

    assert!(matches!(result, Err(Error::VectorStore(_))));
}

#[tokio::test]
async fn test_empty_retrieval_still_answers() {
    let store = Arc::new(StaticStore { passages: vec![] });
    let pipeline = make_pipeline(store, Arc::new(EchoBackend), 4);

    let result = pipeline.process_query("anything").await.unwrap();

    assert_eq!(result.retrieved_count, 0);
    assert!(result.sources.is_empty());
    assert!(result.answer.starts_with("ANSWER:"));
}

#[tokio::test]
async fn test_collection_stats() {
    let store = Arc::new(StaticStore {
        passages: passages_with_sources(&["a", "b", "c"]),
    });
    let pipeline = make_pipeline(store, Arc::new(EchoBackend), 4);

    let stats = pipeline.collection_stats().await.unwrap();
    assert_eq!(stats.document_count, 3);
}

#[tokio::test]
async fn test_math_agent_uses_calculator_for_valid_expressions() {
    let registry = PromptRegistry::default();
    // A failing backend proves the calculator path never touches the LLM
    let agent = MathAgent::new(Arc::new(FailingBackend), &registry).unwrap();

    assert_eq!(agent.run("2^3").await, "8.0");
    assert_eq!(agent.run("what is 2 plus 2").await, "4.0");
}

#[tokio::test]
async fn test_math_agent_falls_back_to_backend_when_exhausted() {
    let registry = PromptRegistry::default();
    let agent = MathAgent::new(Arc::new(EchoBackend), &registry).unwrap();

    // Nothing evaluable survives normalization, so the backend answers
    let answer = agent.run("how many roads must a man walk down").await;
    assert!(answer.starts_with("ANSWER:"));
    assert!(answer.contains("how many roads must a man walk down"));
}

#[tokio::test]
async fn test_math_agent_returns_diagnostic_when_backend_also_fails() {
    let registry = PromptRegistry::default();
    let agent = MathAgent::new(Arc::new(FailingBackend), &registry).unwrap();

    let answer = agent.run("how many roads must a man walk down").await;
    assert!(answer.starts_with("Error: Unable to evaluate") || answer.starts_with("Invalid expression"));
}
