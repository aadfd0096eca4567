//! Question/answer session management.
//!
//! Drives the retrieve-then-synthesize pipeline per question, keeps the
//! session's answered-query history, and carries bounded conversation
//! context so follow-up questions work. Questions within one session are
//! serialized; the indexed corpus is only read, never rebuilt, from here.

use crate::error::Result;
use crate::generation::ChatMessage;
use crate::rag::{AnswerEngine, AnsweredQuery, Retriever};
use tracing::instrument;

/// An interactive Q&A session over the indexed corpus.
pub struct Session {
    retriever: Retriever,
    answerer: AnswerEngine,
    history: Vec<AnsweredQuery>,
    conversation: Vec<ChatMessage>,
    max_conversation_messages: usize,
}

impl Session {
    /// Create a new session.
    pub fn new(retriever: Retriever, answerer: AnswerEngine) -> Self {
        Self {
            retriever,
            answerer,
            history: Vec::new(),
            conversation: Vec::new(),
            max_conversation_messages: 20,
        }
    }

    /// Set the maximum conversation messages carried between questions.
    pub fn with_max_conversation_messages(mut self, max: usize) -> Self {
        self.max_conversation_messages = max;
        self
    }

    /// Ask a question and record the answer in the session history.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&mut self, question: &str) -> Result<AnsweredQuery> {
        let evidence = self.retriever.retrieve(question).await?;
        let answered = self
            .answerer
            .synthesize(question, evidence, &self.conversation)
            .await?;

        self.conversation.push(ChatMessage::user(question));
        self.conversation
            .push(ChatMessage::assistant(answered.answer.clone()));
        if self.conversation.len() > self.max_conversation_messages {
            let excess = self.conversation.len() - self.max_conversation_messages;
            self.conversation.drain(..excess);
        }

        self.history.push(answered.clone());
        Ok(answered)
    }

    /// All questions answered in this session, oldest first.
    pub fn history(&self) -> &[AnsweredQuery] {
        &self.history
    }

    /// Clear history and conversation context. The index is untouched.
    pub fn reset(&mut self) {
        self.history.clear();
        self.conversation.clear();
    }

    /// Serialize the session history as pretty JSON for export.
    pub fn export_history_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.history)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::generation::Generator;
    use crate::loader::ContentUnit;
    use crate::rag::INSUFFICIENT_INFORMATION_ANSWER;
    use crate::vector_store::{IndexedUnit, MemoryVectorStore, VectorStore};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const DIMS: usize = 32;

    /// Deterministic bag-of-words embedder. Tokens are assigned vector slots
    /// in first-seen order, so identical text always embeds identically.
    struct TermEmbedder {
        vocabulary: Mutex<HashMap<String, usize>>,
    }

    impl TermEmbedder {
        fn new() -> Self {
            Self {
                vocabulary: Mutex::new(HashMap::new()),
            }
        }

        fn embed_text(&self, text: &str) -> Vec<f32> {
            let mut vector = vec![0f32; DIMS];
            let mut vocabulary = self.vocabulary.lock().unwrap();

            for token in text
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
            {
                let next = vocabulary.len();
                let slot = *vocabulary.entry(token.to_string()).or_insert(next);
                assert!(slot < DIMS, "test vocabulary exceeded embedder dimensions");
                vector[slot] += 1.0;
            }

            vector
        }
    }

    #[async_trait]
    impl Embedder for TermEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self.embed_text(text))
        }

        async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| self.embed_text(t)).collect())
        }

        fn dimensions(&self) -> usize {
            DIMS
        }
    }

    struct CountingGenerator {
        calls: AtomicUsize,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
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
            Ok("generated answer".to_string())
        }
    }

    async fn indexed_store(
        embedder: &TermEmbedder,
        units: &[(&str, u32, &str)],
    ) -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new(DIMS));
        for (lecture, sequence, text) in units {
            let embedding = embedder.embed(text).await.unwrap();
            store
                .upsert(&IndexedUnit::from_unit(
                    ContentUnit::new(*lecture, *sequence, *text),
                    embedding,
                ))
                .await
                .unwrap();
        }
        store
    }

    fn session(
        store: Arc<MemoryVectorStore>,
        embedder: Arc<TermEmbedder>,
        generator: Arc<CountingGenerator>,
        min_score: f32,
    ) -> Session {
        let retriever = Retriever::new(store, embedder).with_min_score(min_score);
        let answerer = AnswerEngine::new(generator);
        Session::new(retriever, answerer)
    }

    #[tokio::test]
    async fn test_embedding_is_idempotent() {
        let embedder = TermEmbedder::new();
        let a = embedder.embed("precision and recall").await.unwrap();
        let b = embedder.embed("precision and recall").await.unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_exact_text_query_ranks_its_own_unit_first() {
        let embedder = Arc::new(TermEmbedder::new());
        let text = "A posting list stores the documents containing a term.";
        let store = indexed_store(
            &embedder,
            &[
                ("l1", 1, text),
                ("l1", 2, "Champion lists keep only the highest weighted documents."),
            ],
        )
        .await;

        let mut session = session(store, embedder, Arc::new(CountingGenerator::new()), 0.0);
        let answered = session.ask(text).await.unwrap();

        assert_eq!(answered.sources[0].sequence, 1);
        assert!(answered.sources[0].score > 0.99);
    }

    #[tokio::test]
    async fn test_recall_question_ranks_recall_slide_over_precision_slide() {
        let embedder = Arc::new(TermEmbedder::new());
        let store = indexed_store(
            &embedder,
            &[
                ("L1", 1, "Precision is relevant retrieved over total retrieved."),
                ("L1", 2, "Recall is relevant retrieved over total relevant."),
            ],
        )
        .await;

        let mut session = session(store, embedder, Arc::new(CountingGenerator::new()), 0.0);
        let answered = session.ask("What is recall?").await.unwrap();

        assert_eq!(answered.sources.len(), 2);
        assert_eq!(
            (answered.sources[0].lecture.as_str(), answered.sources[0].sequence),
            ("L1", 2)
        );
        assert!(answered.sources[0].score > answered.sources[1].score);
    }

    #[tokio::test]
    async fn test_empty_corpus_yields_fixed_answer_without_generation() {
        let embedder = Arc::new(TermEmbedder::new());
        let store = Arc::new(MemoryVectorStore::new(DIMS));
        let generator = Arc::new(CountingGenerator::new());

        let mut session = session(store, embedder, generator.clone(), 0.25);
        let answered = session.ask("What is recall?").await.unwrap();

        assert_eq!(answered.answer, INSUFFICIENT_INFORMATION_ANSWER);
        assert!(answered.sources.is_empty());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_min_score_above_best_yields_fixed_answer() {
        let embedder = Arc::new(TermEmbedder::new());
        let store = indexed_store(
            &embedder,
            &[("L1", 1, "Stemming conflates word forms to a common stem.")],
        )
        .await;
        let generator = Arc::new(CountingGenerator::new());

        // No shared vocabulary between question and corpus clears 0.99.
        let mut session = session(store, embedder, generator.clone(), 0.99);
        let answered = session.ask("How are skip pointers placed?").await.unwrap();

        assert_eq!(answered.answer, INSUFFICIENT_INFORMATION_ANSWER);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_history_accumulates_and_reset_clears() {
        let embedder = Arc::new(TermEmbedder::new());
        let store = indexed_store(
            &embedder,
            &[("L1", 1, "An inverted index maps terms to posting lists.")],
        )
        .await;

        let mut session = session(store, embedder, Arc::new(CountingGenerator::new()), 0.0);
        session.ask("What does an inverted index map?").await.unwrap();
        session.ask("And posting lists?").await.unwrap();

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].question, "What does an inverted index map?");

        let exported = session.export_history_json().unwrap();
        assert!(exported.contains("inverted index"));

        session.reset();
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_conversation_is_trimmed_to_bound() {
        let embedder = Arc::new(TermEmbedder::new());
        let store = indexed_store(
            &embedder,
            &[("L1", 1, "Tokenization splits text into terms for indexing.")],
        )
        .await;

        let mut session = session(store, embedder, Arc::new(CountingGenerator::new()), 0.0)
            .with_max_conversation_messages(4);

        for _ in 0..5 {
            session.ask("What does tokenization split?").await.unwrap();
        }

        assert_eq!(session.conversation.len(), 4);
        assert_eq!(session.history().len(), 5);
    }
}
