//! Context assembly and answer generation

mod answer;
mod context;

pub use answer::AnswerGenerator;
pub use context::assemble_context;
