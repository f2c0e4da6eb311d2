//! Request types for the HTTP API

use serde::{Deserialize, Serialize};

/// Query request for the RAG pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub query: String,
}

/// Math evaluation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathRequest {
    /// Expression or natural-language math question
    pub expression: String,
}
