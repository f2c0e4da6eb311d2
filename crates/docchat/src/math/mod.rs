//! Math expression pipeline: natural-language normalization, an ordered
//! chain of evaluation strategies, and an LLM-backed agent fallback.

mod agent;
mod ast;
mod calculator;
mod interpreter;
mod normalize;
mod strategy;

pub use agent::MathAgent;
pub use calculator::{Calculator, Evaluation};
pub use normalize::normalize;

use thiserror::Error;

/// Errors produced inside evaluation strategies.
///
/// These never escape the calculator: they drive fallthrough to the next
/// strategy and end up embedded in the final diagnostic string.
#[derive(Debug, Error)]
pub enum MathError {
    /// Expression could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Exact arithmetic overflowed
    #[error("numeric overflow in exact arithmetic")]
    Overflow,

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Result was infinite or NaN
    #[error("non-finite result")]
    NonFinite,

    /// Expression nesting exceeded the evaluation depth limit
    #[error("expression too deeply nested")]
    TooDeep,
}
