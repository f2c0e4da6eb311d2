//! Natural-language math normalization
//!
//! Best-effort heuristic rewrite of free-form questions into a canonical
//! symbolic expression string. Never fails: the worst case is an empty or
//! nonsensical output, which the evaluator's validation rejects.

use once_cell::sync::Lazy;
use regex::Regex;

/// Question prefixes stripped from the start of the input, first match only
const QUESTION_PREFIXES: &[&str] = &[
    "what is ",
    "what's ",
    "calculate ",
    "compute ",
    "find ",
    "what would be ",
    "can you tell me ",
    "tell me ",
    "solve ",
    "evaluate ",
];

/// Characters that may appear in a canonical expression: digits, operators,
/// parentheses, decimal point, space, and the letters of the function names
/// sqrt, log, sin, cos, tan.
const EXPRESSION_CHARS: &str = "0123456789+-*/()^.sqrtlogsincostan ";

/// "[the] square root of <expr>" up to a question mark, end of string, or a
/// following alphabetic word
static SQRT_OF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:the\s+)?square\s+root\s+of\s+(.+?)(?:\?|$|\s+[a-zA-Z])")
        .expect("Invalid regex")
});

/// Verbal operators in replacement order; "to the power of" must come before
/// the shorter "to the"
static VERBAL_OPERATORS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bplus\b", "+"),
        (r"\bminus\b", "-"),
        (r"\btimes\b", "*"),
        (r"\bdivided\s+by\b", "/"),
        (r"\bto\s+the\s+power\s+of\b", "^"),
        (r"\bto\s+the\b", "^"),
        (r"\bsquared\b", "^2"),
        (r"\bcubed\b", "^3"),
    ]
    .into_iter()
    .map(|(pattern, symbol)| (Regex::new(pattern).expect("Invalid regex"), symbol))
    .collect()
});

/// True when the input, ignoring whitespace and decimal points, is digits only
pub(crate) fn is_purely_numeric(input: &str) -> bool {
    let digits: String = input.trim().chars().filter(|c| *c != '.').collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Convert a natural-language math question into a canonical expression
/// string. Purely numeric input and input without any alphabetic character
/// are already canonical and pass through unchanged.
pub fn normalize(raw: &str) -> String {
    if is_purely_numeric(raw) {
        return raw.to_string();
    }
    if !raw.chars().any(|c| c.is_alphabetic()) {
        return raw.trim().to_string();
    }

    let mut query = raw.trim().to_lowercase();

    for prefix in QUESTION_PREFIXES {
        if let Some(rest) = query.strip_prefix(prefix) {
            query = rest.to_string();
            break;
        }
    }

    if let Some(caps) = SQRT_OF.captures(&query) {
        let span = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
        let inner = caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        query = query.replace(&span, &format!("sqrt({})", inner));
    }

    for (pattern, symbol) in VERBAL_OPERATORS.iter() {
        query = pattern.replace_all(&query, *symbol).into_owned();
    }

    query = query.replace(['?', '!'], "");

    let cleaned: String = query
        .chars()
        .filter(|c| EXPRESSION_CHARS.contains(*c))
        .collect();

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purely_numeric_unchanged() {
        assert_eq!(normalize("42"), "42");
        assert_eq!(normalize("3.14"), "3.14");
        assert_eq!(normalize("  100  "), "  100  ");
    }

    #[test]
    fn test_what_is_plus() {
        assert_eq!(normalize("what is 2 plus 2"), "2 + 2");
    }

    #[test]
    fn test_question_prefix_stripped_once() {
        assert_eq!(normalize("calculate 6 times 9"), "6 * 9");
        assert_eq!(normalize("what's 10 minus 4?"), "10 - 4");
    }

    #[test]
    fn test_square_root_rewrite() {
        assert!(normalize("square root of 16").contains("sqrt(16)"));
        assert!(normalize("what is the square root of 144?").contains("sqrt(144)"));
    }

    #[test]
    fn test_power_words() {
        assert_eq!(normalize("2 to the power of 10"), "2 ^ 10");
        assert_eq!(normalize("5 squared"), "5 ^2");
        assert_eq!(normalize("3 cubed"), "3 ^3");
    }

    #[test]
    fn test_divided_by() {
        assert_eq!(normalize("10 divided by 2"), "10 / 2");
    }

    #[test]
    fn test_unknown_words_dropped() {
        let result = normalize("please give me 2 plus 2 thanks");
        // Residual letters are allowed only if they belong to function names;
        // everything else is filtered out
        assert!(result.contains("2 + 2"));
    }

    #[test]
    fn test_idempotent_on_canonical_input() {
        for input in ["2+2", "sqrt(16)", "2 ^ 10", "log(100)", "sin(0)"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input}");
        }
    }

    #[test]
    fn test_never_panics_on_garbage() {
        for input in ["", "???", "what is", "the quick brown fox", "éé∆∆"] {
            let _ = normalize(input);
        }
    }
}
