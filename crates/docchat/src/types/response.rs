//! Response types for the query pipeline and HTTP API

use serde::{Deserialize, Serialize};

use super::document::Passage;

/// Structured result of a full RAG query.
///
/// Created fresh per query; `sources` preserves the first-seen order of
/// distinct source identifiers and `passages` keeps the retriever's
/// relevance ranking untouched for downstream citation display.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// The original query
    pub query: String,
    /// Generated answer (or a readable failure message)
    pub answer: String,
    /// Number of passages retrieved
    pub retrieved_count: usize,
    /// Deduplicated source identifiers, first occurrence wins
    pub sources: Vec<String>,
    /// Retrieved passages in relevance order
    pub passages: Vec<Passage>,
}

/// HTTP response for `POST /api/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub retrieved_count: usize,
    /// Processing time in seconds, rounded to two decimals
    pub processing_time: f64,
}

/// HTTP response for `POST /api/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<String>,
}

/// HTTP response for `GET /api/documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<String>,
    pub count: usize,
}

/// HTTP response for document deletion endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// HTTP response for `POST /api/math`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathResponse {
    pub expression: String,
    pub result: String,
}

/// HTTP response for `GET /api/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub document_count: usize,
}
