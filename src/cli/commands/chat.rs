//! Interactive study session command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::generation::OpenAIGenerator;
use crate::orchestrator::Orchestrator;
use crate::rag::{AnswerEngine, Retriever};
use crate::session::Session;
use crate::vector_store::VectorStore;
use anyhow::Result;
use console::style;
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'pensum doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings.clone())?;
    let model = model.unwrap_or_else(|| settings.answer.model.clone());

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let retriever = Retriever::new(orchestrator.vector_store(), orchestrator.embedder())
        .with_top_k(settings.retrieval.top_k)
        .with_min_score(settings.retrieval.min_score)
        .with_dedup_threshold(settings.retrieval.dedup_threshold);

    let answerer = AnswerEngine::new(Arc::new(OpenAIGenerator::new(&model)))
        .with_prompts(prompts)
        .with_max_context_chars(settings.answer.max_context_chars);

    let mut session = Session::new(retriever, answerer)
        .with_max_conversation_messages(settings.answer.max_history_messages);

    let started = Instant::now();
    let vector_store = orchestrator.vector_store();

    println!("\n{}", style("Pensum Study Session").bold().cyan());
    println!(
        "{}\n",
        style("Ask questions about your lecture notes. Type 'help' for commands, 'exit' to quit.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                print_stats(&session, started);
                Output::info("Good luck with your studies!");
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            "stats" => {
                print_stats(&session, started);
                continue;
            }
            "topics" => {
                print_topics(vector_store.as_ref()).await;
                continue;
            }
            "history" => {
                print_history(&session);
                continue;
            }
            "clear" => {
                session.reset();
                Output::info("Session history cleared.");
                continue;
            }
            _ => {}
        }

        if let Some(path) = input.strip_prefix("save ") {
            match save_history(&session, path.trim()) {
                Ok(count) => Output::success(&format!("Saved {} answers to {}", count, path.trim())),
                Err(e) => Output::error(&format!("Failed to save history: {}", e)),
            }
            continue;
        }

        match session.ask(input).await {
            Ok(answered) => {
                println!(
                    "\n{} {}\n",
                    style("Pensum:").cyan().bold(),
                    answered.answer
                );

                if !answered.sources.is_empty() {
                    let referenced: BTreeSet<String> = answered
                        .sources
                        .iter()
                        .map(|s| s.source_label())
                        .collect();
                    println!(
                        "{}\n",
                        style(format!(
                            "Referenced: {}",
                            referenced.into_iter().collect::<Vec<_>>().join("; ")
                        ))
                        .dim()
                    );
                }
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}

fn print_help() {
    Output::header("Study Session Commands");
    Output::list_item("Ask any question about your lecture notes");
    Output::list_item("'stats' - Show study session statistics");
    Output::list_item("'topics' - List indexed lectures");
    Output::list_item("'history' - Show recent questions and answers");
    Output::list_item("'save <path>' - Export session history as JSON");
    Output::list_item("'clear' - Clear session history");
    Output::list_item("'exit' - End the session");
}

fn print_stats(session: &Session, started: Instant) {
    let elapsed = started.elapsed();
    let minutes = elapsed.as_secs() / 60;
    let seconds = elapsed.as_secs() % 60;

    let lectures: BTreeSet<&str> = session
        .history()
        .iter()
        .flat_map(|a| a.sources.iter().map(|s| s.lecture.as_str()))
        .collect();

    Output::header("Study Session Stats");
    Output::kv("Session duration", &format!("{}m {}s", minutes, seconds));
    Output::kv("Questions asked", &session.history().len().to_string());
    Output::kv("Lectures referenced", &lectures.len().to_string());
    for lecture in lectures {
        Output::list_item(lecture);
    }
}

async fn print_topics(vector_store: &dyn VectorStore) {
    match vector_store.list_lectures().await {
        Ok(lectures) if lectures.is_empty() => {
            Output::info("No lectures indexed yet. Run 'pensum index' first.");
        }
        Ok(lectures) => {
            Output::header("Indexed Lectures");
            for lecture in &lectures {
                Output::lecture_info(&lecture.lecture, lecture.unit_count);
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list lectures: {}", e));
        }
    }
}

fn print_history(session: &Session) {
    if session.history().is_empty() {
        Output::info("No questions asked yet.");
        return;
    }

    Output::header("Recent Questions");
    for answered in session.history().iter().rev().take(5).rev() {
        println!(
            "[{}] {} {}",
            style(answered.asked_at.format("%H:%M")).dim(),
            style("You:").green(),
            answered.question
        );
        let preview: String = answered.answer.chars().take(100).collect();
        println!(
            "        {} {}{}",
            style("Pensum:").cyan(),
            preview,
            if answered.answer.chars().count() > 100 {
                "..."
            } else {
                ""
            }
        );
        println!();
    }
}

fn save_history(session: &Session, path: &str) -> crate::error::Result<usize> {
    let json = session.export_history_json()?;
    std::fs::write(path, json)?;
    Ok(session.history().len())
}
