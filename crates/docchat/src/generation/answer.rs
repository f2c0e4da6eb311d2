//! Answer generation over retrieved passages

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::prompts::{self, PromptRegistry, GENERATION_PROMPT_KEY};
use crate::providers::GenerationBackend;
use crate::types::Passage;

use super::context::assemble_context;

/// Fills the generation template with retrieved context and invokes the
/// generation backend.
///
/// `generate` never returns an error: any failure along the way is logged
/// and converted into a user-facing message.
pub struct AnswerGenerator {
    backend: Arc<dyn GenerationBackend>,
    template: String,
}

impl AnswerGenerator {
    /// Create a generator bound to the registry's generation template
    pub fn new(backend: Arc<dyn GenerationBackend>, registry: &PromptRegistry) -> Result<Self> {
        let template = registry.get(GENERATION_PROMPT_KEY)?.to_string();
        Ok(Self { backend, template })
    }

    /// Generate an answer for the query over the retrieved passages
    pub async fn generate(&self, query: &str, passages: &[Passage]) -> String {
        match self.try_generate(query, passages).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Error generating answer: {}", e);
                format!("Failed to generate an answer: {}", e)
            }
        }
    }

    async fn try_generate(&self, query: &str, passages: &[Passage]) -> Result<String> {
        let context = assemble_context(passages);

        let mut substitutions = HashMap::new();
        substitutions.insert("context", context);
        substitutions.insert("question", query.to_string());

        let prompt = prompts::fill(&self.template, &substitutions)?;

        let reply = self.backend.invoke(&prompt).await?;
        Ok(reply.into_text())
    }
}
