//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    match orchestrator.vector_store().list_lectures().await {
        Ok(lectures) => {
            if lectures.is_empty() {
                Output::info("No lectures indexed yet. Use 'pensum index' to add content.");
            } else {
                Output::header(&format!("Indexed Lectures ({})", lectures.len()));
                println!();

                for lecture in &lectures {
                    Output::lecture_info(&lecture.lecture, lecture.unit_count);
                }

                let total_units: u32 = lectures.iter().map(|l| l.unit_count).sum();
                println!();
                Output::kv("Total lectures", &lectures.len().to_string());
                Output::kv("Total units", &total_units.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list lectures: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
