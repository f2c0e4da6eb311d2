//! Configuration for the document QA service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Document storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Embedding backend configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Generation backend configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Vector store configuration
    #[serde(default)]
    pub vector_db: VectorDbConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides for secrets and directories
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if self.embeddings.api_key.is_none() {
                self.embeddings.api_key = Some(key.clone());
            }
            if self.llm.api_key.is_none() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(dir) = std::env::var("DOCCHAT_DOCS_DIRECTORY") {
            self.storage.docs_directory = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("DOCCHAT_CHROMA_URL") {
            self.vector_db.base_url = url;
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Document storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory where uploaded documents are stored
    pub docs_directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let docs_directory = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docchat")
            .join("docs");

        Self { docs_directory }
    }
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model identifier
    pub model: String,
    /// API key (falls back to the OPENAI_API_KEY environment variable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// Generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat model identifier
    pub model: String,
    /// API key (falls back to the OPENAI_API_KEY environment variable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Vector store (Chroma) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDbConfig {
    /// Chroma server base URL
    pub base_url: String,
    /// Collection name
    pub collection: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            collection: "docchat".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 600,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of passages to retrieve per query
    pub top_k: usize,
    /// Candidate pool size for marginal-relevance search
    pub fetch_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            fetch_k: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.chunking.chunk_size, 600);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [retrieval]
            top_k = 8
            fetch_k = 24
            "#,
        )
        .unwrap();
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.server.port, 8000);
    }
}
