//! Brute-force cosine similarity over the loaded index.

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::store::{DocumentMetadata, IndexedDocument};
use crate::{RagError, Result};

/// Scores at or below this value are never returned by [`search`]
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.1;

/// A ranked passage
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
    pub content: String,
    pub metadata: DocumentMetadata,
    /// `1 - cosine similarity`
    pub distance: f32,
}

impl RetrievalResult {
    #[inline]
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Cosine of the angle between two vectors.
///
/// Returns `0.0` when either vector has zero magnitude.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RagError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() {
        return Err(RagError::Embedding(
            "Cannot compare empty vectors".to_string(),
        ));
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// Score every document and sort by descending similarity.
/// Ties keep index order.
fn rank(query: &[f32], docs: &[IndexedDocument]) -> Result<Vec<(f32, usize)>> {
    let mut scored = docs
        .iter()
        .enumerate()
        .map(|(idx, doc)| cosine_similarity(query, &doc.embedding).map(|score| (score, idx)))
        .collect::<Result<Vec<_>>>()?;

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    Ok(scored)
}

fn to_result(doc: &IndexedDocument, score: f32) -> RetrievalResult {
    RetrievalResult {
        content: doc.content.clone(),
        metadata: doc.metadata.clone(),
        distance: 1.0 - score,
    }
}

/// Best passage per source document, above `threshold`, at most `k` results
#[inline]
pub fn search(
    query: &[f32],
    docs: &[IndexedDocument],
    k: usize,
    threshold: f32,
) -> Result<Vec<RetrievalResult>> {
    if docs.is_empty() {
        warn!("Search requested on an empty index");
        return Ok(Vec::new());
    }

    let ranked = rank(query, docs)?;
    let mut seen = HashSet::new();
    let mut results: Vec<RetrievalResult> = ranked
        .into_iter()
        .filter(|(score, _)| *score > threshold)
        .filter(|(_, idx)| seen.insert(docs[*idx].metadata.document_id))
        .map(|(score, idx)| to_result(&docs[idx], score))
        .collect();

    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    results.truncate(k);

    debug!(
        "Search over {} chunks returned {} results (k={}, threshold={})",
        docs.len(),
        results.len(),
        k,
        threshold
    );
    Ok(results)
}

/// Every passage, best first, with no threshold or de-duplication
#[inline]
pub fn exhaustive(query: &[f32], docs: &[IndexedDocument]) -> Result<Vec<RetrievalResult>> {
    if docs.is_empty() {
        warn!("Exhaustive search requested on an empty index");
        return Ok(Vec::new());
    }

    let results = rank(query, docs)?
        .into_iter()
        .map(|(score, idx)| to_result(&docs[idx], score))
        .collect();
    Ok(results)
}
