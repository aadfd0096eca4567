//! Grounded answer synthesis.

use super::Citation;
use crate::config::Prompts;
use crate::error::Result;
use crate::generation::{ChatMessage, Generator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Fixed answer returned when retrieval finds no evidence. The generative
/// capability is never invoked in that case, so the system cannot fabricate
/// an answer with nothing to ground it.
pub const INSUFFICIENT_INFORMATION_ANSWER: &str =
    "There is insufficient information in the indexed lecture notes to answer this question.";

/// An answered question with the evidence that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweredQuery {
    /// Record id.
    pub id: Uuid,
    /// The question as asked.
    pub question: String,
    /// The generated (or fixed fallback) answer.
    pub answer: String,
    /// Evidence units the answer was grounded in.
    pub sources: Vec<Citation>,
    /// When the question was answered.
    pub asked_at: DateTime<Utc>,
}

impl AnsweredQuery {
    fn new(question: &str, answer: String, sources: Vec<Citation>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.to_string(),
            answer,
            sources,
            asked_at: Utc::now(),
        }
    }
}

/// Synthesizes grounded answers from retrieved evidence.
pub struct AnswerEngine {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    max_context_chars: usize,
}

impl AnswerEngine {
    /// Create a new answer engine.
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            prompts: Prompts::default(),
            max_context_chars: 6000,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set the maximum total characters of evidence text per prompt.
    pub fn with_max_context_chars(mut self, max_context_chars: usize) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }

    /// Produce an answer for the question, grounded in the given evidence.
    ///
    /// `conversation` carries earlier turns for follow-up questions; pass an
    /// empty slice for one-shot use. With no evidence, a fixed insufficient
    /// information answer is returned and the generator is not called. A
    /// generation failure is surfaced to the caller, not retried.
    #[instrument(skip(self, evidence, conversation), fields(question = %question))]
    pub async fn synthesize(
        &self,
        question: &str,
        evidence: Vec<Citation>,
        conversation: &[ChatMessage],
    ) -> Result<AnsweredQuery> {
        info!("Synthesizing answer for: {}", question);

        if evidence.is_empty() {
            debug!("No evidence retrieved, returning fixed answer");
            return Ok(AnsweredQuery::new(
                question,
                INSUFFICIENT_INFORMATION_ANSWER.to_string(),
                Vec::new(),
            ));
        }

        let bounded = bound_context(evidence, self.max_context_chars);
        let context = format_context_for_prompt(&bounded);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context);

        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.answer.user, &vars);

        let system = if conversation.is_empty() {
            &self.prompts.answer.system
        } else {
            &self.prompts.answer.chat_system
        };

        let mut messages = Vec::with_capacity(conversation.len() + 2);
        messages.push(ChatMessage::system(system.clone()));
        messages.extend_from_slice(conversation);
        messages.push(ChatMessage::user(user_prompt));

        let answer = self.generator.generate(&messages).await?;

        debug!("Generated answer with {} sources", bounded.len());
        Ok(AnsweredQuery::new(question, answer, bounded))
    }
}

/// Keep evidence within the context budget, dropping lowest-score-first.
///
/// Evidence arrives ranked by descending score, so trimming the tail drops
/// the weakest units. The best unit is always kept, even when it alone
/// exceeds the budget.
fn bound_context(evidence: Vec<Citation>, max_chars: usize) -> Vec<Citation> {
    let mut total = 0usize;
    let mut bounded = Vec::with_capacity(evidence.len());

    for citation in evidence {
        total += citation.text.len();
        if total > max_chars && !bounded.is_empty() {
            break;
        }
        bounded.push(citation);
    }

    bounded
}

/// Format evidence for inclusion in a prompt, tagged for attribution.
fn format_context_for_prompt(citations: &[Citation]) -> String {
    citations
        .iter()
        .enumerate()
        .map(|(i, citation)| {
            format!(
                "---\n[{}] {}\n{}\n---",
                i + 1,
                citation.source_label(),
                citation.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PensumError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator that returns a fixed answer and counts invocations.
    struct CountingGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PensumError::Generation("model offline".to_string()));
            }
            Ok("a grounded answer".to_string())
        }
    }

    fn citation(lecture: &str, sequence: u32, text: &str, score: f32) -> Citation {
        Citation {
            lecture: lecture.to_string(),
            sequence,
            text: text.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_empty_evidence_skips_generation() {
        let generator = Arc::new(CountingGenerator::new());
        let engine = AnswerEngine::new(generator.clone());

        let answered = engine.synthesize("anything?", Vec::new(), &[]).await.unwrap();

        assert_eq!(answered.answer, INSUFFICIENT_INFORMATION_ANSWER);
        assert!(answered.sources.is_empty());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_carries_its_evidence() {
        let generator = Arc::new(CountingGenerator::new());
        let engine = AnswerEngine::new(generator.clone());

        let evidence = vec![citation("l1", 2, "recall definition", 0.8)];
        let answered = engine
            .synthesize("what is recall?", evidence, &[])
            .await
            .unwrap();

        assert_eq!(answered.answer, "a grounded answer");
        assert_eq!(answered.sources.len(), 1);
        assert_eq!(answered.sources[0].sequence, 2);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces() {
        let engine = AnswerEngine::new(Arc::new(CountingGenerator::failing()));

        let evidence = vec![citation("l1", 1, "some content", 0.9)];
        let err = engine.synthesize("q?", evidence, &[]).await.unwrap_err();
        assert!(matches!(err, PensumError::Generation(_)));
    }

    #[test]
    fn test_bound_context_drops_lowest_scores_first() {
        let evidence = vec![
            citation("l1", 1, "aaaaaaaaaa", 0.9),
            citation("l1", 2, "bbbbbbbbbb", 0.8),
            citation("l1", 3, "cccccccccc", 0.7),
        ];

        let bounded = bound_context(evidence, 20);
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded[0].score, 0.9);
        assert_eq!(bounded[1].score, 0.8);
    }

    #[test]
    fn test_bound_context_keeps_best_unit_even_over_budget() {
        let evidence = vec![citation("l1", 1, "a very long evidence text", 0.9)];
        let bounded = bound_context(evidence, 5);
        assert_eq!(bounded.len(), 1);
    }

    #[test]
    fn test_prompt_context_tags_sources() {
        let citations = vec![
            citation("lecture_02", 4, "inverted index layout", 0.9),
            citation("lecture_05", 1, "query processing", 0.7),
        ];
        let context = format_context_for_prompt(&citations);
        assert!(context.contains("[1] lecture_02, slide 4"));
        assert!(context.contains("[2] lecture_05, slide 1"));
        assert!(context.contains("inverted index layout"));
    }
}
