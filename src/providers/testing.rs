//! In-process fakes for the provider traits.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{EmbeddingClient, GenerationClient};
use crate::{RagError, Result};

/// Embeds text as keyword counts over a fixed vocabulary.
/// Text matching none of the keywords maps to the zero vector.
pub(crate) struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl KeywordEmbedder {
    pub(crate) fn new(vocabulary: &[&'static str]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
            calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    /// Fail the nth call (1-based) and every call after it
    pub(crate) fn failing_from(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn vector_for(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        self.vocabulary
            .iter()
            .map(|word| lowered.matches(word).count() as f32)
            .collect()
    }
}

#[async_trait]
impl EmbeddingClient for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call.is_some_and(|n| call >= n) {
            return Err(RagError::Embedding(format!("quota exceeded on call {}", call)));
        }
        Ok(self.vector_for(text))
    }

    fn describe(&self) -> String {
        "keyword fake".to_string()
    }
}

/// Returns a canned reply and records every prompt it receives
pub(crate) struct RecordingGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerationClient for RecordingGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply
            .clone()
            .ok_or_else(|| RagError::Generation("model unavailable".to_string()))
    }

    fn describe(&self) -> String {
        "recording fake".to_string()
    }
}
