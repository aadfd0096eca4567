//! SQLite-based vector store implementation.
//!
//! Persists the index as a durable snapshot so re-indexing is not required
//! on every run. Cosine similarity is computed in Rust over a full table
//! scan; for corpora beyond the thousands of units, swap in a dedicated
//! vector database behind the same trait.

use super::{
    check_dimensions, cosine_similarity, rank_results, IndexedLecture, IndexedUnit, SearchResult,
    VectorStore,
};
use crate::error::{PensumError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// Current snapshot schema version. Bumping it invalidates old snapshots.
const SCHEMA_VERSION: &str = "1";

/// SQLite-based vector store.
#[derive(Debug)]
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    dimensions: usize,
}

impl SqliteVectorStore {
    /// Open (or create) a snapshot at the given path for embeddings of the
    /// given dimensionality.
    ///
    /// Fails with `IndexSchemaMismatch` when the snapshot on disk was built
    /// with a different dimensionality; the caller must rebuild rather than
    /// let vectors be silently truncated.
    #[instrument(skip_all)]
    pub fn new(path: &Path, dimensions: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self::init(conn, dimensions)?;
        info!("Opened SQLite vector store at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory(dimensions: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, dimensions)
    }

    fn init(conn: Connection, dimensions: usize) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS units (
                id TEXT PRIMARY KEY,
                lecture TEXT NOT NULL,
                sequence INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_units_lecture ON units(lecture);
            "#,
        )?;

        let store = Self {
            conn: Mutex::new(conn),
            dimensions,
        };
        store.check_schema()?;
        Ok(store)
    }

    /// Validate the stored schema version and dimensionality against this
    /// store's configuration, recording them on first use.
    fn check_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let stored_dims: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'dimensions'",
                [],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match stored_dims {
            Some(value) => {
                let found: usize = value.parse().map_err(|_| {
                    PensumError::VectorStore(format!("Corrupt dimensions entry: {}", value))
                })?;
                if found != self.dimensions {
                    return Err(PensumError::IndexSchemaMismatch {
                        expected: self.dimensions,
                        found,
                    });
                }
            }
            None => {
                conn.execute(
                    "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1), ('dimensions', ?2)",
                    params![SCHEMA_VERSION, self.dimensions.to_string()],
                )?;
            }
        }

        Ok(())
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PensumError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_unit(row: &rusqlite::Row<'_>) -> rusqlite::Result<IndexedUnit> {
        let embedding_bytes: Vec<u8> = row.get(4)?;
        Ok(IndexedUnit {
            id: row.get(0)?,
            lecture: row.get(1)?,
            sequence: row.get(2)?,
            text: row.get(3)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, unit))]
    async fn upsert(&self, unit: &IndexedUnit) -> Result<()> {
        check_dimensions(self.dimensions, unit.embedding.len())?;
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO units (id, lecture, sequence, text, embedding)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                unit.id,
                unit.lecture,
                unit.sequence,
                unit.text,
                Self::embedding_to_bytes(&unit.embedding),
            ],
        )?;

        debug!("Upserted unit {}", unit.id);
        Ok(())
    }

    #[instrument(skip(self, units))]
    async fn upsert_batch(&self, units: &[IndexedUnit]) -> Result<usize> {
        for unit in units {
            check_dimensions(self.dimensions, unit.embedding.len())?;
        }

        let conn = self.lock_conn()?;
        let tx = conn.unchecked_transaction()?;

        for unit in units {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO units (id, lecture, sequence, text, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    unit.id,
                    unit.lecture,
                    unit.sequence,
                    unit.text,
                    Self::embedding_to_bytes(&unit.embedding),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} units", units.len());
        Ok(units.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        check_dimensions(self.dimensions, query_embedding.len())?;
        let conn = self.lock_conn()?;

        let mut stmt =
            conn.prepare("SELECT id, lecture, sequence, text, embedding FROM units")?;

        let units = stmt.query_map([], Self::row_to_unit)?;

        let mut results: Vec<SearchResult> = units
            .filter_map(|unit_result| unit_result.ok())
            .map(|unit| {
                let score = cosine_similarity(query_embedding, &unit.embedding);
                SearchResult { unit, score }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        rank_results(&mut results);
        results.truncate(top_k);

        debug!("Found {} matching units", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_lecture(&self, lecture: &str) -> Result<usize> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute("DELETE FROM units WHERE lecture = ?1", params![lecture])?;
        info!("Deleted {} units for lecture {}", deleted, lecture);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_lectures(&self) -> Result<Vec<IndexedLecture>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT lecture, COUNT(*) as unit_count
            FROM units
            GROUP BY lecture
            ORDER BY lecture
            "#,
        )?;

        let lectures = stmt.query_map([], |row| {
            Ok(IndexedLecture {
                lecture: row.get(0)?,
                unit_count: row.get(1)?,
            })
        })?;

        Ok(lectures.filter_map(|l| l.ok()).collect())
    }

    async fn is_lecture_indexed(&self, lecture: &str) -> Result<bool> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM units WHERE lecture = ?1",
            params![lecture],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn get_by_lecture(&self, lecture: &str) -> Result<Vec<IndexedUnit>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, lecture, sequence, text, embedding
            FROM units
            WHERE lecture = ?1
            ORDER BY sequence
            "#,
        )?;

        let units = stmt.query_map(params![lecture], Self::row_to_unit)?;
        let result: Vec<IndexedUnit> = units.filter_map(|u| u.ok()).collect();
        debug!("Found {} units for lecture {}", result.len(), lecture);
        Ok(result)
    }

    async fn unit_count(&self) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM units", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
