//! Generation backend trait and reply shapes

use async_trait::async_trait;

use crate::error::Result;

/// The closed set of reply shapes a generation backend may produce:
/// either bare text or a message object carrying a content field.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationReply {
    /// Plain text completion
    Plain(String),
    /// Structured message with a textual content field
    Message { content: String },
}

impl GenerationReply {
    /// Extract the textual payload
    pub fn into_text(self) -> String {
        match self {
            Self::Plain(text) => text,
            Self::Message { content } => content,
        }
    }
}

/// Trait for prompt-in, text-out generation
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run a single prompt through the backend
    async fn invoke(&self, prompt: &str) -> Result<GenerationReply>;

    /// Get backend name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_extraction() {
        assert_eq!(
            GenerationReply::Plain("hi".to_string()).into_text(),
            "hi"
        );
        assert_eq!(
            GenerationReply::Message {
                content: "hello".to_string()
            }
            .into_text(),
            "hello"
        );
    }
}
