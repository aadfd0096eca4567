//! Indexing pipeline orchestrator.
//!
//! Coordinates the build phase: loading lecture artifacts, embedding their
//! units in batches, and replacing the lecture's index segment.

use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::loader::{ContentLoader, ContentUnit};
use crate::vector_store::{IndexedUnit, SqliteVectorStore, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Pensum indexing pipeline.
pub struct Orchestrator {
    settings: Settings,
    loader: ContentLoader,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let loader = ContentLoader::new(
            settings.content_dir(),
            settings.content.min_unit_chars,
            settings.content.boilerplate_threshold,
        );

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
            settings.embedding.max_retries,
        ));

        let vector_store: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::new(
            &settings.sqlite_path(),
            settings.embedding.dimensions as usize,
        )?);

        Ok(Self {
            settings,
            loader,
            embedder,
            vector_store,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        loader: ContentLoader,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            settings,
            loader,
            embedder,
            vector_store,
        }
    }

    /// Get a reference to the vector store.
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// List lectures with a content artifact available for indexing.
    pub fn list_available_lectures(&self) -> Result<Vec<String>> {
        self.loader.list_lectures()
    }

    /// Build (or rebuild) one lecture's index segment.
    ///
    /// Loads the lecture's units, embeds them in batches, and replaces any
    /// prior segment for the same lecture. Units whose text is unchanged
    /// from the stored segment keep their stored embedding, so rebuilding
    /// unchanged content produces an identical segment without new
    /// embedding calls.
    #[instrument(skip(self), fields(lecture = %lecture))]
    pub async fn build_lecture(&self, lecture: &str, force: bool) -> Result<BuildResult> {
        if !force && self.vector_store.is_lecture_indexed(lecture).await? {
            info!("Lecture {} is already indexed, skipping", lecture);
            return Ok(BuildResult {
                lecture: lecture.to_string(),
                units_indexed: 0,
                skipped: true,
            });
        }

        let units = self.loader.load_lecture(lecture)?;
        info!("Loaded {} units for lecture {}", units.len(), lecture);

        let existing: HashMap<String, IndexedUnit> = self
            .vector_store
            .get_by_lecture(lecture)
            .await?
            .into_iter()
            .map(|unit| (unit.id.clone(), unit))
            .collect();

        let mut indexed = Vec::with_capacity(units.len());
        let mut pending = Vec::new();
        for unit in units {
            let id = IndexedUnit::unit_id(&unit.lecture, unit.sequence);
            match existing.get(&id) {
                Some(prior) if prior.text == unit.text => indexed.push(prior.clone()),
                _ => pending.push(unit),
            }
        }

        if !pending.is_empty() {
            info!("Embedding {} new or changed units", pending.len());
            indexed.extend(self.embed_units(pending).await?);
        }
        indexed.sort_by_key(|unit| unit.sequence);

        self.vector_store.delete_by_lecture(lecture).await?;
        let count = self.vector_store.upsert_batch(&indexed).await?;

        Ok(BuildResult {
            lecture: lecture.to_string(),
            units_indexed: count,
            skipped: false,
        })
    }

    /// Build every lecture found in the content directory.
    pub async fn build_all(&self, force: bool) -> Result<Vec<BuildResult>> {
        let mut results = Vec::new();
        for lecture in self.loader.list_lectures()? {
            results.push(self.build_lecture(&lecture, force).await?);
        }
        Ok(results)
    }

    /// Incrementally add units to the index without clearing lecture scopes.
    ///
    /// Units whose id is already present overwrite the prior entry.
    #[instrument(skip(self, units), fields(count = units.len()))]
    pub async fn add_units(&self, units: Vec<ContentUnit>) -> Result<usize> {
        if units.is_empty() {
            return Ok(0);
        }
        let indexed = self.embed_units(units).await?;
        self.vector_store.upsert_batch(&indexed).await
    }

    /// Embed a batch of content units, pairing each with its vector.
    async fn embed_units(&self, units: Vec<ContentUnit>) -> Result<Vec<IndexedUnit>> {
        let texts: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
        let embeddings = self.embedder.embed_many(&texts).await?;

        Ok(units
            .into_iter()
            .zip(embeddings)
            .map(|(unit, embedding)| IndexedUnit::from_unit(unit, embedding))
            .collect())
    }
}

/// Result of building one lecture.
#[derive(Debug)]
pub struct BuildResult {
    /// Lecture name.
    pub lecture: String,
    /// Number of units indexed.
    pub units_indexed: usize,
    /// Whether the build was skipped (already indexed).
    pub skipped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    /// Embedder that maps text length to a tiny deterministic vector and
    /// counts how many texts it has embedded.
    struct LengthEmbedder {
        embedded: std::sync::atomic::AtomicUsize,
    }

    impl LengthEmbedder {
        fn new() -> Self {
            Self {
                embedded: std::sync::atomic::AtomicUsize::new(0),
            }
        }

        fn embedded_count(&self) -> usize {
            self.embedded.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.embedded
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn orchestrator_over(
        dir: &std::path::Path,
    ) -> (Orchestrator, Arc<MemoryVectorStore>, Arc<LengthEmbedder>) {
        let store = Arc::new(MemoryVectorStore::new(2));
        let embedder = Arc::new(LengthEmbedder::new());
        let loader = ContentLoader::new(dir.to_path_buf(), 10, 0.5);
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            loader,
            embedder.clone(),
            store.clone(),
        );
        (orchestrator, store, embedder)
    }

    #[tokio::test]
    async fn test_build_lecture_indexes_all_units() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("l1.txt"),
            "--- Slide 1 ---\nzone indexes weight fields\n--- Slide 2 ---\nranked retrieval scores documents\n",
        )
        .unwrap();

        let (orchestrator, store, _embedder) = orchestrator_over(dir.path());
        let result = orchestrator.build_lecture("l1", false).await.unwrap();

        assert!(!result.skipped);
        assert_eq!(result.units_indexed, 2);
        assert_eq!(store.unit_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_build_skips_already_indexed_lecture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("l1.txt"), "some lecture content here").unwrap();

        let (orchestrator, _store, _embedder) = orchestrator_over(dir.path());
        orchestrator.build_lecture("l1", false).await.unwrap();

        let second = orchestrator.build_lecture("l1", false).await.unwrap();
        assert!(second.skipped);
        assert_eq!(second.units_indexed, 0);
    }

    #[tokio::test]
    async fn test_forced_rebuild_of_unchanged_content_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("l1.txt"),
            "first paragraph of content\n\nsecond paragraph of content",
        )
        .unwrap();

        let (orchestrator, store, embedder) = orchestrator_over(dir.path());
        orchestrator.build_lecture("l1", false).await.unwrap();
        let before = serde_json::to_vec(&store.get_by_lecture("l1").await.unwrap()).unwrap();
        let embedded_once = embedder.embedded_count();

        orchestrator.build_lecture("l1", true).await.unwrap();
        let after = serde_json::to_vec(&store.get_by_lecture("l1").await.unwrap()).unwrap();

        assert_eq!(before, after);
        // Unchanged text keeps its stored embedding.
        assert_eq!(embedder.embedded_count(), embedded_once);
    }

    #[tokio::test]
    async fn test_add_units_overwrites_matching_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, store, _embedder) = orchestrator_over(dir.path());

        orchestrator
            .add_units(vec![ContentUnit::new("l1", 1, "original unit text")])
            .await
            .unwrap();
        orchestrator
            .add_units(vec![
                ContentUnit::new("l1", 1, "revised unit text"),
                ContentUnit::new("l1", 2, "brand new unit text"),
            ])
            .await
            .unwrap();

        let units = store.get_by_lecture("l1").await.unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "revised unit text");
    }

    #[tokio::test]
    async fn test_build_all_covers_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "content for lecture a").unwrap();
        std::fs::write(dir.path().join("b.txt"), "content for lecture b").unwrap();

        let (orchestrator, store, _embedder) = orchestrator_over(dir.path());
        let results = orchestrator.build_all(false).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(store.list_lectures().await.unwrap().len(), 2);
    }
}
