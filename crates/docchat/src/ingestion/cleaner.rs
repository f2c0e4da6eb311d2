//! Text cleaning with parallel fan-out over documents

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::types::Passage;

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("Invalid regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));
static SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?]").expect("Invalid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Normalize raw document text: lowercase, strip URLs, HTML tags, and
/// special characters (punctuation `.,!?` survives), collapse whitespace.
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let text = text.to_lowercase();
    let text = URL.replace_all(&text, "");
    let text = HTML_TAG.replace_all(&text, "");
    let text = SPECIAL.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");

    text.trim().to_string()
}

/// Clean a batch of documents on the blocking worker pool.
///
/// Documents are cleaned concurrently with no completion-order guarantee,
/// then reassembled in their original source order.
pub async fn clean_documents(documents: Vec<Passage>) -> Result<Vec<Passage>> {
    let tasks: Vec<_> = documents
        .into_iter()
        .map(|mut document| {
            tokio::task::spawn_blocking(move || {
                document.content = clean_text(&document.content);
                document
            })
        })
        .collect();

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.map_err(|e| Error::internal(format!("Cleaning task failed: {}", e))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses_whitespace() {
        assert_eq!(clean_text("Hello   WORLD\n\nagain"), "hello world again");
    }

    #[test]
    fn test_strips_urls() {
        assert_eq!(
            clean_text("see https://example.com/page for details"),
            "see for details"
        );
    }

    #[test]
    fn test_strips_html_tags() {
        assert_eq!(clean_text("<p>some <b>bold</b> text</p>"), "some bold text");
    }

    #[test]
    fn test_keeps_basic_punctuation() {
        assert_eq!(clean_text("Really? Yes, really!"), "really? yes, really!");
        assert_eq!(clean_text("a; b: c @ d"), "a b c d");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text("   "), "");
    }

    #[tokio::test]
    async fn test_parallel_cleaning_preserves_order() {
        let documents = vec![
            Passage::with_source("FIRST Doc", "1"),
            Passage::with_source("SECOND   Doc", "2"),
            Passage::with_source("THIRD\tDoc", "3"),
        ];

        let cleaned = clean_documents(documents).await.unwrap();

        let contents: Vec<&str> = cleaned.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["first doc", "second doc", "third doc"]);
        let sources: Vec<_> = cleaned.iter().map(|d| d.source().unwrap()).collect();
        assert_eq!(sources, vec!["1", "2", "3"]);
    }
}
