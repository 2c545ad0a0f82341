
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::documents::SourceDocument;

/// A window of a résumé's text, the unit that gets embedded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// `"{document_id}_{n}"`, with `n` starting at 1
    pub chunk_id: String,
    pub document_id: u32,
    pub display_name: String,
    pub text: String,
}

/// Configuration for sliding-window chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window length in characters
    pub window_size: usize,
    /// Characters shared by consecutive windows
    pub overlap: usize,
    /// Trimmed windows this short or shorter are dropped
    pub min_chunk_length: usize,
    /// Hard cap on the number of windows examined
    pub max_iterations: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            window_size: 300,
            overlap: 50,
            min_chunk_length: 30,
            max_iterations: 1000,
        }
    }
}

/// Split `text` into overlapping windows of `config.window_size` characters.
///
/// Windows advance by `window_size - overlap`. Each window is trimmed and
/// kept only if it is longer than `min_chunk_length`. Stops once a window
/// reaches the end of the text, when the window start would not move
/// forward, or after `max_iterations` windows.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    // Byte offset of every char, plus the end of the string
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut iterations = 0;

    while start < char_len && iterations < config.max_iterations {
        iterations += 1;

        let end = (start + config.window_size).min(char_len);
        let window = text
            .get(boundaries[start]..boundaries[end])
            .unwrap_or_default()
            .trim();

        if window.chars().count() > config.min_chunk_length {
            chunks.push(window.to_string());
        }

        if end >= char_len {
            break;
        }

        let next = end.saturating_sub(config.overlap);
        if next <= start {
            debug!(
                "Chunk window stopped advancing (window {}, overlap {})",
                config.window_size, config.overlap
            );
            break;
        }
        start = next;
    }

    chunks
}

/// Chunk one résumé's rendered text
#[inline]
pub fn chunk_document(document: &SourceDocument, config: &ChunkingConfig) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = chunk_text(&document.render_text(), config)
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            chunk_id: format!("{}_{}", document.document_id, index + 1),
            document_id: document.document_id,
            display_name: document.display_name.clone(),
            text,
        })
        .collect();

    debug!(
        "Chunked '{}' into {} chunks",
        document.display_name,
        chunks.len()
    );

    chunks
}

/// Chunk every résumé, preserving input order
#[inline]
pub fn chunk_corpus(documents: &[SourceDocument], config: &ChunkingConfig) -> Vec<Chunk> {
    documents
        .iter()
        .flat_map(|document| chunk_document(document, config))
        .collect()
}
