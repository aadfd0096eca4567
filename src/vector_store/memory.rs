//! In-memory vector store implementation.
//!
//! Useful for testing and small corpora. Reads share the lock; a rebuild
//! takes the write half and excludes searches until it finishes.

use super::{
    check_dimensions, cosine_similarity, rank_results, IndexedLecture, IndexedUnit, SearchResult,
    VectorStore,
};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    units: RwLock<HashMap<String, IndexedUnit>>,
    dimensions: usize,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store for embeddings of the given
    /// dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            units: RwLock::new(HashMap::new()),
            dimensions,
        }
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, unit: &IndexedUnit) -> Result<()> {
        check_dimensions(self.dimensions, unit.embedding.len())?;
        let mut units = self.units.write().unwrap();
        units.insert(unit.id.clone(), unit.clone());
        Ok(())
    }

    async fn upsert_batch(&self, batch: &[IndexedUnit]) -> Result<usize> {
        for unit in batch {
            check_dimensions(self.dimensions, unit.embedding.len())?;
        }
        let mut units = self.units.write().unwrap();
        for unit in batch {
            units.insert(unit.id.clone(), unit.clone());
        }
        Ok(batch.len())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        check_dimensions(self.dimensions, query_embedding.len())?;
        let units = self.units.read().unwrap();

        let mut results: Vec<SearchResult> = units
            .values()
            .map(|unit| {
                let score = cosine_similarity(query_embedding, &unit.embedding);
                SearchResult {
                    unit: unit.clone(),
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        rank_results(&mut results);
        results.truncate(top_k);

        Ok(results)
    }

    async fn delete_by_lecture(&self, lecture: &str) -> Result<usize> {
        let mut units = self.units.write().unwrap();
        let initial_len = units.len();
        units.retain(|_, unit| unit.lecture != lecture);
        Ok(initial_len - units.len())
    }

    async fn list_lectures(&self) -> Result<Vec<IndexedLecture>> {
        let units = self.units.read().unwrap();

        let mut lecture_map: HashMap<String, u32> = HashMap::new();
        for unit in units.values() {
            *lecture_map.entry(unit.lecture.clone()).or_insert(0) += 1;
        }

        let mut lectures: Vec<IndexedLecture> = lecture_map
            .into_iter()
            .map(|(lecture, unit_count)| IndexedLecture {
                lecture,
                unit_count,
            })
            .collect();
        lectures.sort_by(|a, b| a.lecture.cmp(&b.lecture));

        Ok(lectures)
    }

    async fn is_lecture_indexed(&self, lecture: &str) -> Result<bool> {
        let units = self.units.read().unwrap();
        Ok(units.values().any(|u| u.lecture == lecture))
    }

    async fn get_by_lecture(&self, lecture: &str) -> Result<Vec<IndexedUnit>> {
        let units = self.units.read().unwrap();
        let mut result: Vec<IndexedUnit> = units
            .values()
            .filter(|u| u.lecture == lecture)
            .cloned()
            .collect();
        result.sort_by_key(|u| u.sequence);
        Ok(result)
    }

    async fn unit_count(&self) -> Result<usize> {
        let units = self.units.read().unwrap();
        Ok(units.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PensumError;
    use crate::loader::ContentUnit;

    fn unit(lecture: &str, sequence: u32, text: &str, embedding: Vec<f32>) -> IndexedUnit {
        IndexedUnit::from_unit(ContentUnit::new(lecture, sequence, text), embedding)
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new(3);

        let u1 = unit("lecture_01", 1, "Hello world", vec![1.0, 0.0, 0.0]);
        let u2 = unit("lecture_01", 2, "Goodbye world", vec![0.0, 1.0, 0.0]);

        store.upsert_batch(&[u1, u2]).await.unwrap();

        assert_eq!(store.unit_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10, -1.0).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);

        let lectures = store.list_lectures().await.unwrap();
        assert_eq!(lectures.len(), 1);
        assert_eq!(lectures[0].unit_count, 2);
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_empty() {
        let store = MemoryVectorStore::new(3);
        let results = store.search(&[1.0, 0.0, 0.0], 10, 0.0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_min_score_filters_results() {
        let store = MemoryVectorStore::new(2);
        store
            .upsert(&unit("l1", 1, "content", vec![1.0, 0.0]))
            .await
            .unwrap();

        // Orthogonal query scores 0.0, below the threshold.
        let results = store.search(&[0.0, 1.0], 10, 0.5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_id() {
        let store = MemoryVectorStore::new(2);
        store
            .upsert(&unit("l1", 1, "old text", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(&unit("l1", 1, "new text", vec![0.0, 1.0]))
            .await
            .unwrap();

        assert_eq!(store.unit_count().await.unwrap(), 1);
        let units = store.get_by_lecture("l1").await.unwrap();
        assert_eq!(units[0].text, "new text");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let store = MemoryVectorStore::new(3);
        let err = store
            .upsert(&unit("l1", 1, "content", vec![1.0, 0.0]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PensumError::IndexSchemaMismatch {
                expected: 3,
                found: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_delete_by_lecture() {
        let store = MemoryVectorStore::new(1);
        store.upsert(&unit("a", 1, "x", vec![1.0])).await.unwrap();
        store.upsert(&unit("b", 1, "y", vec![1.0])).await.unwrap();

        let deleted = store.delete_by_lecture("a").await.unwrap();
        assert_eq!(deleted, 1);
        assert!(!store.is_lecture_indexed("a").await.unwrap());
        assert!(store.is_lecture_indexed("b").await.unwrap());
    }
}
