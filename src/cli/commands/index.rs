//! Index command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::PensumError;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the index command.
pub async fn run_index(lecture: Option<&str>, force: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'pensum doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let lectures = match lecture {
        Some(name) => vec![name.to_string()],
        None => {
            let available = orchestrator.list_available_lectures()?;
            if available.is_empty() {
                Output::warning("No lecture text files found in the content directory.");
                Output::info("Add <lecture>.txt or <lecture>_slides_text.txt files and retry.");
                return Ok(());
            }
            available
        }
    };

    let progress = Output::progress_bar(lectures.len() as u64, "Indexing lectures");
    let mut indexed_units = 0usize;
    let mut skipped = 0usize;

    for lecture in &lectures {
        progress.set_message(lecture.clone());

        match orchestrator.build_lecture(lecture, force).await {
            Ok(result) if result.skipped => {
                skipped += 1;
            }
            Ok(result) => {
                indexed_units += result.units_indexed;
            }
            Err(e @ PensumError::SourceNotFound { .. })
            | Err(e @ PensumError::EmptyContent { .. }) => {
                progress.finish_and_clear();
                Output::error(&format!("{}", e));
                return Err(e.into());
            }
            Err(e) => {
                progress.finish_and_clear();
                Output::error(&format!("Indexing failed: {}", e));
                return Err(e.into());
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    Output::success(&format!(
        "Indexed {} units across {} lectures",
        indexed_units,
        lectures.len() - skipped
    ));
    if skipped > 0 {
        Output::info(&format!(
            "Skipped {} already-indexed lectures (use --force to rebuild)",
            skipped
        ));
    }

    Ok(())
}
