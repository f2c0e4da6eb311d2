//! Prompt template registry with placeholder substitution

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Key of the built-in answer-generation template
pub const GENERATION_PROMPT_KEY: &str = "generation_prompt";

/// Key of the built-in math-assistant template
pub const MATH_AGENT_PROMPT_KEY: &str = "math_agent_prompt";

const GENERATION_PROMPT: &str = r#"You are a helpful and knowledgeable assistant.
Use the following context to answer the question accurately and concisely.

Context:
{context}

Question:
{question}

Answer:"#;

const MATH_AGENT_PROMPT: &str = r#"You are a precise mathematical assistant specialized in interpreting and solving math problems.
When faced with a mathematical query, first analyze whether it is a direct calculation or needs interpretation.
For expressions like 'square root of 144 + 5', determine if it means sqrt(144) + 5 or sqrt(144 + 5) based on context.
Break complex problems into steps and compute numerical results accurately.
If the input is not a mathematical expression, explain what calculation would be needed.
Input: {input}"#;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("Invalid regex"));

/// Named prompt templates with `{placeholder}` substitution.
///
/// Re-registering an existing key overwrites it (last write wins).
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    prompts: HashMap<String, String>,
}

impl Default for PromptRegistry {
    fn default() -> Self {
        let mut registry = Self {
            prompts: HashMap::new(),
        };
        registry.register(GENERATION_PROMPT_KEY, GENERATION_PROMPT);
        registry.register(MATH_AGENT_PROMPT_KEY, MATH_AGENT_PROMPT);
        registry
    }
}

impl PromptRegistry {
    /// Register a template under a key, replacing any previous value
    pub fn register(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.prompts.insert(key.into(), template.into());
    }

    /// Look up a template by key
    pub fn get(&self, key: &str) -> Result<&str> {
        self.prompts
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::PromptNotFound(key.to_string()))
    }
}

/// Fill every `{placeholder}` in a template from the substitution map.
///
/// Fails if any referenced placeholder has no entry.
pub fn fill(template: &str, substitutions: &HashMap<&str, String>) -> Result<String> {
    let mut missing: Option<String> = None;

    let filled = PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
        let name = &caps[1];
        match substitutions.get(name) {
            Some(value) => value.clone(),
            None => {
                if missing.is_none() {
                    missing = Some(name.to_string());
                }
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(Error::MissingPlaceholder(name)),
        None => Ok(filled.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_present() {
        let registry = PromptRegistry::default();
        assert!(registry.get(GENERATION_PROMPT_KEY).is_ok());
        assert!(registry.get(MATH_AGENT_PROMPT_KEY).is_ok());
    }

    #[test]
    fn test_get_unknown_key() {
        let registry = PromptRegistry::default();
        assert!(matches!(
            registry.get("nope"),
            Err(Error::PromptNotFound(_))
        ));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = PromptRegistry::default();
        registry.register("greeting", "Hello {name}");
        registry.register("greeting", "Hi {name}");
        assert_eq!(registry.get("greeting").unwrap(), "Hi {name}");
    }

    #[test]
    fn test_fill() {
        let mut substitutions = HashMap::new();
        substitutions.insert("context", "some context".to_string());
        substitutions.insert("question", "what?".to_string());

        let filled = fill("C: {context}\nQ: {question}", &substitutions).unwrap();
        assert_eq!(filled, "C: some context\nQ: what?");
    }

    #[test]
    fn test_fill_missing_placeholder() {
        let substitutions = HashMap::new();
        let result = fill("Q: {question}", &substitutions);
        assert!(matches!(result, Err(Error::MissingPlaceholder(name)) if name == "question"));
    }

    #[test]
    fn test_generation_template_fills() {
        let registry = PromptRegistry::default();
        let template = registry.get(GENERATION_PROMPT_KEY).unwrap();

        let mut substitutions = HashMap::new();
        substitutions.insert("context", "The sky is blue.".to_string());
        substitutions.insert("question", "What color is the sky?".to_string());

        let filled = fill(template, &substitutions).unwrap();
        assert!(filled.contains("The sky is blue."));
        assert!(filled.contains("What color is the sky?"));
    }
}
