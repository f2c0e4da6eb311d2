//! Error types for the document QA service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for docchat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template lookup failure
    #[error("Prompt '{0}' not found in registry")]
    PromptNotFound(String),

    /// Placeholder referenced by a template has no substitution
    #[error("Missing substitution for placeholder '{0}'")]
    MissingPlaceholder(String),

    /// Unsupported upload file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// No documents have been ingested yet
    #[error("No documents have been uploaded yet. Please upload documents first.")]
    NoDocuments,

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Embedding backend error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector store / retrieval error
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Generation backend error
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector store error
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::PromptNotFound(key) => (
                StatusCode::BAD_REQUEST,
                "prompt_not_found",
                format!("Prompt '{}' not found in registry", key),
            ),
            Error::MissingPlaceholder(name) => (
                StatusCode::BAD_REQUEST,
                "missing_placeholder",
                format!("Missing substitution for placeholder '{}'", name),
            ),
            Error::UnsupportedFileType(ext) => (
                StatusCode::BAD_REQUEST,
                "unsupported_type",
                format!("Unsupported file type: {}", ext),
            ),
            Error::DocumentNotFound(name) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Document not found: {}", name),
            ),
            Error::NoDocuments => (
                StatusCode::NOT_FOUND,
                "no_documents",
                self.to_string(),
            ),
            Error::FileParse { filename, message } => (
                StatusCode::BAD_REQUEST,
                "parse_error",
                format!("Failed to parse '{}': {}", filename, message),
            ),
            Error::Embedding(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error", msg.clone())
            }
            Error::VectorStore(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "vector_store_error", msg.clone())
            }
            Error::Llm(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
