//! Sentence-aware text chunking with overlap

use unicode_segmentation::UnicodeSegmentation;

use crate::types::Passage;

/// Splits document text into fixed-size overlapping chunks, respecting
/// sentence boundaries where possible.
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap carried from the end of one chunk into the next
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Chunk every document, preserving document order and metadata
    pub fn split_documents(&self, documents: &[Passage]) -> Vec<Passage> {
        let mut chunks = Vec::new();

        for document in documents {
            for content in self.chunk_text(&document.content) {
                chunks.push(Passage {
                    content,
                    metadata: document.metadata.clone(),
                });
            }
        }

        chunks
    }

    /// Split one text into chunks
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in text.split_sentence_bounds() {
            if !current.is_empty() && current.len() + sentence.len() > self.chunk_size {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
                current = self.overlap_tail(&current);
            }
            current.push_str(sentence);
        }

        let trimmed = current.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        chunks
    }

    /// Overlap text carried from the end of a chunk, starting at a sentence
    /// or word boundary when one exists
    fn overlap_tail(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }
        if text.len() <= self.overlap {
            return text.to_string();
        }

        let mut start = text.len() - self.overlap;
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }
        let tail = &text[start..];

        if let Some(pos) = tail.find(". ") {
            return tail[pos + 2..].to_string();
        }
        if let Some(pos) = tail.find(' ') {
            return tail[pos + 1..].to_string();
        }

        tail.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = TextChunker::new(600, 200);
        let chunks = chunker.chunk_text("just one short sentence.");
        assert_eq!(chunks, vec!["just one short sentence."]);
    }

    #[test]
    fn test_long_text_is_split_with_bounded_chunks() {
        let chunker = TextChunker::new(100, 20);
        let text = "One sentence here. ".repeat(30);
        let chunks = chunker.chunk_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // A chunk may exceed the target by at most one sentence plus
            // the carried overlap
            assert!(chunk.len() <= 100 + 20 + "One sentence here. ".len());
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let chunker = TextChunker::new(60, 30);
        let text = "alpha beta gamma. delta epsilon zeta. eta theta iota. kappa lambda mu.";
        let chunks = chunker.chunk_text(&text);

        assert!(chunks.len() >= 2);
        // The second chunk starts with text already seen at the end of the
        // first chunk
        let first_tail_word = chunks[0].split_whitespace().last().unwrap();
        assert!(chunks[1].contains(first_tail_word.trim_end_matches('.')));
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(600, 200);
        assert!(chunker.chunk_text("").is_empty());
        assert!(chunker.chunk_text("   ").is_empty());
    }

    #[test]
    fn test_metadata_propagates_to_chunks() {
        let chunker = TextChunker::new(50, 10);
        let documents = vec![Passage::with_source(
            "First sentence goes here. Second sentence goes here. Third one too.",
            "doc.txt",
        )];

        let chunks = chunker.split_documents(&documents);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.source(), Some("doc.txt"));
        }
    }
}
