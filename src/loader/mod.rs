//! Lecture content loading.
//!
//! Reads per-lecture text artifacts produced by the upstream extraction step,
//! splits them into addressable content units, and attaches lecture/slide
//! metadata.

mod clean;
mod segment;

pub use clean::strip_boilerplate;
pub use segment::split_units;

use crate::error::{PensumError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// A single unit of lecture content, before embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUnit {
    /// Lecture/source name this unit belongs to.
    pub lecture: String,
    /// Ordinal position within the lecture (slide/page number, 1-based).
    pub sequence: u32,
    /// Cleaned natural-language content. Never empty or whitespace-only.
    pub text: String,
}

impl ContentUnit {
    /// Create a new content unit.
    pub fn new(lecture: impl Into<String>, sequence: u32, text: impl Into<String>) -> Self {
        Self {
            lecture: lecture.into(),
            sequence,
            text: text.into(),
        }
    }
}

/// Loads lecture text artifacts from a content directory.
///
/// Artifacts are plain text files named `<lecture>.txt` or
/// `<lecture>_slides_text.txt`, already segmented by slide with a stable
/// ordering. Loading the same artifact twice yields the same units.
pub struct ContentLoader {
    content_dir: PathBuf,
    min_unit_chars: usize,
    boilerplate_threshold: f32,
}

impl ContentLoader {
    /// Create a loader over the given content directory.
    pub fn new(content_dir: PathBuf, min_unit_chars: usize, boilerplate_threshold: f32) -> Self {
        Self {
            content_dir,
            min_unit_chars,
            boilerplate_threshold,
        }
    }

    /// List the lectures that have a content artifact available.
    pub fn list_lectures(&self) -> Result<Vec<String>> {
        if !self.content_dir.exists() {
            return Ok(Vec::new());
        }

        let mut lectures: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&self.content_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let name = stem.strip_suffix("_slides_text").unwrap_or(stem);
                lectures.push(name.to_string());
            }
        }

        lectures.sort();
        lectures.dedup();
        Ok(lectures)
    }

    /// Load a lecture's content units.
    ///
    /// Fails with `SourceNotFound` when no artifact exists for the lecture,
    /// and with `EmptyContent` when the artifact yields zero usable units
    /// after segmentation and cleaning.
    #[instrument(skip(self))]
    pub fn load_lecture(&self, lecture: &str) -> Result<Vec<ContentUnit>> {
        let path = self.artifact_path(lecture).ok_or_else(|| {
            PensumError::SourceNotFound {
                lecture: lecture.to_string(),
            }
        })?;

        let content = std::fs::read_to_string(&path)?;

        let segments = split_units(&content);
        let cleaned = strip_boilerplate(&segments, self.boilerplate_threshold);

        let units: Vec<ContentUnit> = cleaned
            .into_iter()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty() && text.len() >= self.min_unit_chars)
            .enumerate()
            .map(|(i, text)| ContentUnit::new(lecture, i as u32 + 1, text))
            .collect();

        if units.is_empty() {
            return Err(PensumError::EmptyContent {
                lecture: lecture.to_string(),
            });
        }

        debug!("Loaded {} units from {:?}", units.len(), path);
        Ok(units)
    }

    /// Resolve the artifact file for a lecture, if one exists.
    fn artifact_path(&self, lecture: &str) -> Option<PathBuf> {
        let candidates = [
            self.content_dir.join(format!("{}_slides_text.txt", lecture)),
            self.content_dir.join(format!("{}.txt", lecture)),
        ];
        candidates.into_iter().find(|p| p.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_for(dir: &std::path::Path) -> ContentLoader {
        ContentLoader::new(dir.to_path_buf(), 10, 0.5)
    }

    #[test]
    fn test_load_lecture_splits_and_numbers_units() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lecture_01_slides_text.txt"),
            "--- Slide 1 ---\nBoolean retrieval uses exact matching.\n--- Slide 2 ---\nRanked retrieval orders documents by score.\n",
        )
        .unwrap();

        let units = loader_for(dir.path()).load_lecture("lecture_01").unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].sequence, 1);
        assert_eq!(units[1].sequence, 2);
        assert!(units[0].text.contains("Boolean"));
        assert!(units[1].text.contains("Ranked"));
        assert!(units.iter().all(|u| u.lecture == "lecture_01"));
    }

    #[test]
    fn test_load_lecture_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("l1.txt"),
            "First paragraph with enough text.\n\nSecond paragraph with enough text.\n",
        )
        .unwrap();

        let loader = loader_for(dir.path());
        let first = loader.load_lecture("l1").unwrap();
        let second = loader.load_lecture("l1").unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.sequence, b.sequence);
        }
    }

    #[test]
    fn test_missing_artifact_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader_for(dir.path()).load_lecture("nope").unwrap_err();
        assert!(matches!(err, PensumError::SourceNotFound { .. }));
    }

    #[test]
    fn test_whitespace_only_artifact_is_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blank.txt"), "   \n\n  \t\n").unwrap();
        let err = loader_for(dir.path()).load_lecture("blank").unwrap_err();
        assert!(matches!(err, PensumError::EmptyContent { .. }));
    }

    #[test]
    fn test_list_lectures_strips_artifact_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("intro_slides_text.txt"), "x").unwrap();
        std::fs::write(dir.path().join("evaluation.txt"), "x").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();

        let lectures = loader_for(dir.path()).list_lectures().unwrap();
        assert_eq!(lectures, vec!["evaluation".to_string(), "intro".to_string()]);
    }
}
