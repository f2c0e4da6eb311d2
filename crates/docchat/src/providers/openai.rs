//! OpenAI-compatible HTTP backends for embeddings and chat generation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingBackend;
use super::llm::{GenerationBackend, GenerationReply};

/// Embedding models accepted by the backend
const SUPPORTED_EMBEDDING_MODELS: &[&str] = &[
    "text-embedding-ada-002",
    "text-embedding-3-small",
    "text-embedding-3-large",
];

/// Resolve the API key from config or the environment; missing credentials
/// fail immediately and are never retried.
fn resolve_api_key(configured: Option<&String>) -> Result<String> {
    configured
        .cloned()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::Config("OpenAI API key is required".to_string()))
}

/// Retry an operation with exponential backoff
async fn retry_request<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                last_error = Some(e);
                if attempt < max_retries {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    tracing::warn!(
                        "Request failed (attempt {}/{}), retrying in {:?}",
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::internal("Unknown error")))
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI embeddings backend
pub struct OpenAiEmbeddings {
    client: Client,
    config: EmbeddingConfig,
    api_key: String,
}

impl OpenAiEmbeddings {
    /// Create a new embeddings backend.
    ///
    /// Fails fast on an unsupported model identifier or missing API key.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        if !SUPPORTED_EMBEDDING_MODELS.contains(&config.model.as_str()) {
            return Err(Error::Config(format!(
                "Unsupported embedding model: {}. Choose from {:?}",
                config.model, SUPPORTED_EMBEDDING_MODELS
            )));
        }

        let api_key = resolve_api_key(config.api_key.as_ref())?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.config.base_url);
        let model = self.config.model.clone();
        let texts = texts.to_vec();
        let client = self.client.clone();
        let api_key = self.api_key.clone();

        retry_request(self.config.max_retries, || {
            let url = url.clone();
            let model = model.clone();
            let texts = texts.clone();
            let client = client.clone();
            let api_key = api_key.clone();

            async move {
                let request = EmbeddingsRequest {
                    model: &model,
                    input: &texts,
                };

                let response = client
                    .post(&url)
                    .bearer_auth(&api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::embedding(format!(
                        "Embedding failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let parsed: EmbeddingsResponse = response.json().await.map_err(|e| {
                    Error::embedding(format!("Failed to parse embedding response: {}", e))
                })?;

                let mut items = parsed.data;
                items.sort_by_key(|item| item.index);
                Ok(items.into_iter().map(|item| item.embedding).collect())
            }
        })
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI chat-completion backend
pub struct OpenAiChat {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

impl OpenAiChat {
    /// Create a new chat backend; fails fast on a missing API key
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(config.api_key.as_ref())?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// Check if the API is reachable with the configured credentials
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.base_url);

        match self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiChat {
    async fn invoke(&self, prompt: &str) -> Result<GenerationReply> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let model = self.config.model.clone();
        let temperature = self.config.temperature;
        let max_tokens = self.config.max_tokens;
        let prompt = prompt.to_string();
        let client = self.client.clone();
        let api_key = self.api_key.clone();

        retry_request(self.config.max_retries, || {
            let url = url.clone();
            let model = model.clone();
            let prompt = prompt.clone();
            let client = client.clone();
            let api_key = api_key.clone();

            async move {
                let request = ChatRequest {
                    model: &model,
                    messages: vec![ChatMessage {
                        role: "user",
                        content: &prompt,
                    }],
                    temperature,
                    max_tokens,
                };

                let response = client
                    .post(&url)
                    .bearer_auth(&api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::llm(format!("Generation request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::llm(format!(
                        "Generation failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let parsed: ChatResponse = response.json().await.map_err(|e| {
                    Error::llm(format!("Failed to parse generation response: {}", e))
                })?;

                let content = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| Error::llm("Response contained no choices"))?;

                Ok(GenerationReply::Message { content })
            }
        })
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_model_rejected() {
        let config = EmbeddingConfig {
            model: "word2vec".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };

        let result = OpenAiEmbeddings::new(&config);
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Unsupported")));
    }

    #[test]
    fn test_supported_model_accepted() {
        let config = EmbeddingConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };

        assert!(OpenAiEmbeddings::new(&config).is_ok());
    }
}
