//! Evidence retrieval for question answering.

use super::Citation;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{cosine_similarity, SearchResult, VectorStore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Retrieves ranked evidence for a question from the vector index.
pub struct Retriever {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    min_score: f32,
    dedup_threshold: f32,
}

impl Retriever {
    /// Create a new retriever with default limits.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            top_k: 5,
            min_score: 0.25,
            dedup_threshold: 0.95,
        }
    }

    /// Set the maximum number of evidence units.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Set the similarity above which adjacent units collapse into one.
    pub fn with_dedup_threshold(mut self, dedup_threshold: f32) -> Self {
        self.dedup_threshold = dedup_threshold;
        self
    }

    /// Retrieve evidence for a question.
    ///
    /// Embeds the question, searches the index, and collapses near-duplicate
    /// neighbors. An empty result means nothing cleared `min_score`; it is a
    /// normal outcome, not an error.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn retrieve(&self, question: &str) -> Result<Vec<Citation>> {
        let query_embedding = self.embedder.embed(question).await?;

        let results = self
            .vector_store
            .search(&query_embedding, self.top_k, self.min_score)
            .await?;

        let deduped = dedup_neighbors(results, self.dedup_threshold);
        debug!("Retrieved {} evidence units", deduped.len());

        Ok(deduped.into_iter().map(Citation::from).collect())
    }
}

/// Collapse results that are adjacent slides of the same lecture with highly
/// similar content, keeping the higher-scoring representative.
///
/// Input is ranked, so the first unit seen for any duplicate pair is the one
/// that survives.
fn dedup_neighbors(results: Vec<SearchResult>, threshold: f32) -> Vec<SearchResult> {
    let mut kept: Vec<SearchResult> = Vec::with_capacity(results.len());

    for candidate in results {
        let duplicate = kept.iter().any(|existing| {
            existing.unit.lecture == candidate.unit.lecture
                && existing.unit.sequence.abs_diff(candidate.unit.sequence) == 1
                && cosine_similarity(&existing.unit.embedding, &candidate.unit.embedding)
                    > threshold
        });

        if !duplicate {
            kept.push(candidate);
        }
    }

    kept
}
