//! Vector store abstraction for Pensum.
//!
//! Provides a trait-based interface for different vector index backends.
//! Search is a linear scan over stored embeddings, which is plenty for
//! corpora in the thousands of units; an approximate-nearest-neighbor
//! backend can be substituted behind the same trait without changing
//! callers.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::{PensumError, Result};
use crate::loader::ContentUnit;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A content unit stored in the vector index, with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedUnit {
    /// Stable identifier, unique within the corpus.
    pub id: String,
    /// Lecture/source name this unit belongs to.
    pub lecture: String,
    /// Ordinal position within the lecture (slide number).
    pub sequence: u32,
    /// Text content of this unit.
    pub text: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

impl IndexedUnit {
    /// Create an indexed unit from a loaded content unit and its embedding.
    ///
    /// The id is derived from lecture and sequence, so re-indexing unchanged
    /// content assigns identical ids.
    pub fn from_unit(unit: ContentUnit, embedding: Vec<f32>) -> Self {
        Self {
            id: Self::unit_id(&unit.lecture, unit.sequence),
            lecture: unit.lecture,
            sequence: unit.sequence,
            text: unit.text,
            embedding,
        }
    }

    /// Deterministic unit id for a (lecture, sequence) pair.
    pub fn unit_id(lecture: &str, sequence: u32) -> String {
        format!("{}#{:05}", lecture, sequence)
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched unit.
    pub unit: IndexedUnit,
    /// Cosine similarity in [-1, 1] (higher is better).
    pub score: f32,
}

/// Summary information about an indexed lecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedLecture {
    /// Lecture name.
    pub lecture: String,
    /// Number of indexed units.
    pub unit_count: u32,
}

/// Trait for vector store implementations.
///
/// Stores are internally synchronized: queries may run concurrently against
/// a stable snapshot, while writes for a lecture exclude readers for the
/// duration of the write.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a unit with its embedding. An existing unit with the same id
    /// is overwritten.
    async fn upsert(&self, unit: &IndexedUnit) -> Result<()>;

    /// Bulk upsert units.
    async fn upsert_batch(&self, units: &[IndexedUnit]) -> Result<usize>;

    /// Search for the `top_k` most similar units scoring at least `min_score`.
    ///
    /// Results are ordered by descending score; equal scores are ordered by
    /// ascending (lecture, sequence). An empty index yields an empty result,
    /// not an error.
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete all units for a lecture. Returns the number removed.
    async fn delete_by_lecture(&self, lecture: &str) -> Result<usize>;

    /// List all indexed lectures.
    async fn list_lectures(&self) -> Result<Vec<IndexedLecture>>;

    /// Check if a lecture has any indexed units.
    async fn is_lecture_indexed(&self, lecture: &str) -> Result<bool>;

    /// Get all units for a lecture, ordered by sequence.
    async fn get_by_lecture(&self, lecture: &str) -> Result<Vec<IndexedUnit>>;

    /// Get total unit count.
    async fn unit_count(&self) -> Result<usize>;

    /// Dimensionality this index accepts.
    fn dimensions(&self) -> usize;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Order results by descending score, breaking ties by ascending
/// (lecture, sequence) so repeated searches rank identically.
pub fn rank_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.unit.lecture.cmp(&b.unit.lecture))
            .then_with(|| a.unit.sequence.cmp(&b.unit.sequence))
    });
}

/// Reject a vector whose dimensionality does not match the index.
pub(crate) fn check_dimensions(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(PensumError::IndexSchemaMismatch { expected, found });
    }
    Ok(())
}
