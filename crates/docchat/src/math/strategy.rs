//! Ordered evaluation strategy chain
//!
//! Each strategy is a pure function from the cleaned expression to a result
//! string or a failure. The calculator iterates the list top to bottom and
//! stops at the first success; no strategy is ever retried.

use super::{ast, interpreter, MathError};

/// A named evaluation strategy
pub(super) struct EvalStrategy {
    pub name: &'static str,
    pub run: fn(&str) -> Result<String, MathError>,
}

/// Strategies in fallback order: exact symbolic evaluation, the restricted
/// f64 interpreter, then the lenient last-resort evaluator.
pub(super) const STRATEGIES: &[EvalStrategy] = &[
    EvalStrategy {
        name: "symbolic",
        run: ast::evaluate,
    },
    EvalStrategy {
        name: "interpreter",
        run: interpreter::evaluate,
    },
    EvalStrategy {
        name: "lenient",
        run: interpreter::evaluate_lenient,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = STRATEGIES.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["symbolic", "interpreter", "lenient"]);
    }

    #[test]
    fn test_first_success_would_win() {
        // The symbolic stage handles plain arithmetic, so the chain never
        // reaches the later stages for it
        assert_eq!((STRATEGIES[0].run)("2+2").unwrap(), "4.0");
    }

    #[test]
    fn test_lenient_catches_what_earlier_stages_reject() {
        assert!((STRATEGIES[0].run)("2**3").is_err());
        assert!((STRATEGIES[1].run)("2**3").is_err());
        assert_eq!((STRATEGIES[2].run)("2**3").unwrap(), "8");
    }
}
