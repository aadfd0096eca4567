//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::Retriever;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'pensum doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings.clone())?;

    let retriever = Retriever::new(orchestrator.vector_store(), orchestrator.embedder())
        .with_top_k(limit)
        .with_min_score(min_score)
        .with_dedup_threshold(settings.retrieval.dedup_threshold);

    let spinner = Output::spinner("Searching...");

    let results = retriever.retrieve(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(citations) => {
            if citations.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", citations.len()));

                for citation in &citations {
                    Output::search_result(&citation.source_label(), citation.score, &citation.text);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
