//! Provider abstractions for the embedding, generation, and vector-store
//! collaborators, plus the HTTP-backed implementations.

pub mod chroma;
pub mod embedding;
pub mod llm;
pub mod openai;
pub mod vector_store;

pub use chroma::ChromaStore;
pub use embedding::EmbeddingBackend;
pub use llm::{GenerationBackend, GenerationReply};
pub use openai::{OpenAiChat, OpenAiEmbeddings};
pub use vector_store::VectorStoreProvider;
