//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::generation::OpenAIGenerator;
use crate::orchestrator::Orchestrator;
use crate::rag::{AnswerEngine, Retriever};
use crate::session::Session;
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    top_k: usize,
    min_score: Option<f32>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'pensum doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings.clone())?;

    let model = model.unwrap_or_else(|| settings.answer.model.clone());
    let min_score = min_score.unwrap_or(settings.retrieval.min_score);

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let retriever = Retriever::new(orchestrator.vector_store(), orchestrator.embedder())
        .with_top_k(top_k)
        .with_min_score(min_score)
        .with_dedup_threshold(settings.retrieval.dedup_threshold);

    let answerer = AnswerEngine::new(Arc::new(OpenAIGenerator::new(&model)))
        .with_prompts(prompts)
        .with_max_context_chars(settings.answer.max_context_chars);

    let mut session = Session::new(retriever, answerer);

    let spinner = Output::spinner("Searching lecture notes...");

    match session.ask(question).await {
        Ok(answered) => {
            spinner.finish_and_clear();

            println!("\n{}\n", answered.answer);

            if !answered.sources.is_empty() {
                Output::header("Sources");
                for source in &answered.sources {
                    Output::search_result(&source.source_label(), source.score, &source.text);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
