//! docchat: document question answering with retrieval-augmented generation
//!
//! Users upload text/PDF files, the service chunks and indexes them into a
//! vector store, and questions are answered by retrieving relevant passages
//! and asking a generation backend to synthesize an answer with its sources.
//! A math agent evaluates arithmetic and natural-language math questions
//! through a rule-based/symbolic fallback chain.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod math;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use math::{Calculator, MathAgent};
pub use pipeline::{CollectionStats, RagPipeline};
pub use types::{Passage, QueryResult};
