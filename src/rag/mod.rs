//! Retrieval-augmented question answering with source attribution.
//!
//! Provides the ability to ask questions and get answers grounded in the
//! indexed lecture notes.

mod answer;
mod retrieval;

pub use answer::{AnswerEngine, AnsweredQuery, INSUFFICIENT_INFORMATION_ANSWER};
pub use retrieval::Retriever;

use crate::vector_store::SearchResult;
use serde::{Deserialize, Serialize};

/// A retrieved evidence unit, stripped down for prompting and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Lecture name.
    pub lecture: String,
    /// Slide number within the lecture.
    pub sequence: u32,
    /// Text content.
    pub text: String,
    /// Similarity score.
    pub score: f32,
}

impl Citation {
    /// Format the source position for display (e.g. "lecture_03, slide 7").
    pub fn source_label(&self) -> String {
        format!("{}, slide {}", self.lecture, self.sequence)
    }
}

impl From<SearchResult> for Citation {
    fn from(result: SearchResult) -> Self {
        Self {
            lecture: result.unit.lecture,
            sequence: result.unit.sequence,
            text: result.unit.text,
            score: result.score,
        }
    }
}
