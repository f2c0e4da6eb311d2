//! Passage type shared by ingestion and retrieval

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A unit of document text with its metadata.
///
/// Produced by the ingestion pipeline (one per chunk) and returned by the
/// similarity-search backend (most relevant first). The `source` metadata
/// field carries the originating file path and `chunk_id` the sequential
/// chunk number assigned at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Text content
    pub content: String,
    /// Arbitrary metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Passage {
    /// Create a passage with empty metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Create a passage with a `source` metadata entry
    pub fn with_source(content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut passage = Self::new(content);
        passage
            .metadata
            .insert("source".to_string(), serde_json::json!(source.into()));
        passage
    }

    /// Source document identifier, when present in metadata
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }

    /// Sequential chunk number assigned at ingestion, when present
    pub fn chunk_id(&self) -> Option<u64> {
        self.metadata.get("chunk_id").and_then(|v| v.as_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_lookup() {
        let passage = Passage::with_source("some text", "manual.pdf");
        assert_eq!(passage.source(), Some("manual.pdf"));
        assert_eq!(passage.chunk_id(), None);
    }

    #[test]
    fn test_missing_source() {
        let passage = Passage::new("no metadata here");
        assert_eq!(passage.source(), None);
    }
}
