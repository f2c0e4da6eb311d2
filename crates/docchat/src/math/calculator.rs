//! Expression validation and the evaluation fallback chain

use super::normalize::{is_purely_numeric, normalize};
use super::strategy::STRATEGIES;

/// Characters permitted in a cleaned expression: digits, operators,
/// parentheses, decimal point, and the letters of sqrt/log/sin/cos/tan.
const VALID_CHARS: &str = "0123456789+-*/().^sqrtlogsincostan";

const OPERATORS: &str = "+-*/^";

/// Tagged outcome of expression evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// A numeric result, formatted as a string
    Value(String),
    /// Validation rejected the expression; terminal, never retried
    Invalid(String),
    /// Every strategy failed
    Exhausted { input: String, detail: String },
}

impl Evaluation {
    /// Whether this outcome carries a numeric result
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Render the outcome as the user-facing result string
    pub fn into_message(self) -> String {
        match self {
            Self::Value(value) => value,
            Self::Invalid(message) => message,
            Self::Exhausted { input, detail } => format!(
                "Error: Unable to evaluate '{}'. Please check the expression. Details: {}",
                input, detail
            ),
        }
    }
}

/// Evaluates math expressions, including natural-language inputs.
///
/// `evaluate` always returns a string and never fails: invalid input and
/// exhausted strategy chains both produce readable diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Calculator {
    /// Create a calculator
    pub fn new() -> Self {
        Self
    }

    /// Evaluate an expression to a result or diagnostic string
    pub fn evaluate(&self, expression: &str) -> String {
        self.evaluate_expression(expression).into_message()
    }

    /// Evaluate an expression to a tagged outcome
    pub fn evaluate_expression(&self, expression: &str) -> Evaluation {
        // Natural-language input gets normalized first; symbolic input is
        // used as-is
        let candidate = if !is_purely_numeric(expression)
            && expression.chars().any(|c| c.is_alphabetic())
        {
            normalize(expression)
        } else {
            expression.to_string()
        };

        let cleaned: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();

        if !is_valid_expression(&cleaned) {
            return Evaluation::Invalid(format!(
                "Invalid expression: '{}'. Please use numbers and operators (+, -, *, /, ^, sqrt, log, sin, cos, tan).",
                cleaned
            ));
        }

        let mut last_error = None;
        for strategy in STRATEGIES {
            match (strategy.run)(&cleaned) {
                Ok(value) => {
                    tracing::debug!(strategy = strategy.name, result = %value, "expression evaluated");
                    return Evaluation::Value(value);
                }
                Err(e) => {
                    tracing::debug!(strategy = strategy.name, error = %e, "strategy failed");
                    last_error = Some(e);
                }
            }
        }

        Evaluation::Exhausted {
            input: expression.to_string(),
            detail: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no evaluation strategy available".to_string()),
        }
    }
}

/// Character-set and structural validation.
///
/// Rejects anything outside the allowed character set and runs of binary
/// operators (`2 + + +`). A unary minus after another operator and the `**`
/// power spelling are allowed through to the strategies.
fn is_valid_expression(cleaned: &str) -> bool {
    if cleaned.is_empty() {
        return false;
    }
    if !cleaned.chars().all(|c| VALID_CHARS.contains(c)) {
        return false;
    }

    let mut prev: Option<char> = None;
    for c in cleaned.chars() {
        if let Some(p) = prev {
            if OPERATORS.contains(p) && OPERATORS.contains(c) {
                let unary_minus = c == '-';
                let double_star = p == '*' && c == '*';
                if !unary_minus && !double_star {
                    return false;
                }
            }
        }
        prev = Some(c);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbolic_power() {
        assert_eq!(Calculator::new().evaluate("2^3"), "8.0");
    }

    #[test]
    fn test_natural_language_addition() {
        assert_eq!(Calculator::new().evaluate("what is 2 plus 2"), "4.0");
    }

    #[test]
    fn test_natural_language_square_root() {
        assert_eq!(Calculator::new().evaluate("square root of 16"), "4.0");
    }

    #[test]
    fn test_log_base_ten() {
        let calculator = Calculator::new();
        assert_eq!(calculator.evaluate("log(100)"), "2.0");
        assert_ne!(calculator.evaluate("log(2.718281828)"), "1.0");
    }

    #[test]
    fn test_operator_run_rejected_before_evaluation() {
        let result = Calculator::new().evaluate("2 + + +");
        assert!(result.starts_with("Invalid expression:"));
        assert!(result.contains("2+++"));
    }

    #[test]
    fn test_disallowed_characters_rejected() {
        let result = Calculator::new().evaluate("2 = 2");
        assert!(result.starts_with("Invalid expression:"));
    }

    #[test]
    fn test_unary_minus_allowed() {
        assert_eq!(Calculator::new().evaluate("2*-3"), "-6.0");
    }

    #[test]
    fn test_double_star_reaches_lenient_stage() {
        assert_eq!(Calculator::new().evaluate("2**3"), "8");
    }

    #[test]
    fn test_purely_numeric_passthrough() {
        assert_eq!(Calculator::new().evaluate("42"), "42.0");
    }

    #[test]
    fn test_exhausted_chain_is_diagnostic_string() {
        let result = Calculator::new().evaluate("()");
        assert!(result.starts_with("Error: Unable to evaluate '()'"));
    }

    #[test]
    fn test_never_panics() {
        let calculator = Calculator::new();
        for input in ["", "   ", "(((((", ")))))", "....", "sqrt", "2 2 2"] {
            let _ = calculator.evaluate(input);
        }
    }
}
