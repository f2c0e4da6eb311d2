//! Math agent: calculator first, generation backend as fallback

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::prompts::{self, PromptRegistry, MATH_AGENT_PROMPT_KEY};
use crate::providers::GenerationBackend;

use super::calculator::{Calculator, Evaluation};

/// Evaluates math queries through the rule-based/symbolic calculator and
/// falls back to the generation backend when every strategy is exhausted.
///
/// `run` never fails: if the backend fallback also fails, the calculator's
/// diagnostic is returned.
pub struct MathAgent {
    calculator: Calculator,
    backend: Arc<dyn GenerationBackend>,
    template: String,
}

impl MathAgent {
    /// Create an agent bound to the registry's math-assistant template
    pub fn new(backend: Arc<dyn GenerationBackend>, registry: &PromptRegistry) -> Result<Self> {
        let template = registry.get(MATH_AGENT_PROMPT_KEY)?.to_string();
        Ok(Self {
            calculator: Calculator::new(),
            backend,
            template,
        })
    }

    /// Evaluate a math query to a result string
    pub async fn run(&self, query: &str) -> String {
        match self.calculator.evaluate_expression(query) {
            Evaluation::Value(value) => value,
            // Validation failures are terminal; only an exhausted strategy
            // chain falls back to the backend
            invalid @ Evaluation::Invalid(_) => invalid.into_message(),
            exhausted @ Evaluation::Exhausted { .. } => {
                let diagnostic = exhausted.into_message();
                tracing::info!("Calculator could not evaluate input, consulting backend");

                match self.consult_backend(query).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        tracing::warn!("Math backend fallback failed: {}", e);
                        diagnostic
                    }
                }
            }
        }
    }

    async fn consult_backend(&self, query: &str) -> Result<String> {
        let mut substitutions = HashMap::new();
        substitutions.insert("input", query.to_string());

        let prompt = prompts::fill(&self.template, &substitutions)?;
        let reply = self.backend.invoke(&prompt).await?;
        Ok(reply.into_text())
    }
}
