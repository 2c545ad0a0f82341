// Embeddings module
// Turns résumés into the text windows that get embedded

pub mod chunking;

pub use chunking::{Chunk, ChunkingConfig, chunk_corpus, chunk_document, chunk_text};
