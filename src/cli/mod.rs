//! CLI module for Pensum.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Pensum - Lecture Notes Search and Q&A
///
/// A local-first CLI tool for indexing extracted lecture text and asking
/// questions about it. The name "Pensum" comes from the Norwegian/Scandinavian
/// word for the required reading of a course.
#[derive(Parser, Debug)]
#[command(name = "pensum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Pensum and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Index lecture text artifacts into the vector database
    Index {
        /// Lecture to index (all lectures in the content directory if omitted)
        lecture: Option<String>,

        /// Force re-indexing even if already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Ask a question and get an answer from your lecture notes
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,

        /// Maximum number of evidence units to include
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short = 's', long)]
        min_score: Option<f32>,
    },

    /// Search for relevant lecture content without generating an answer
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.25")]
        min_score: f32,
    },

    /// Start an interactive study session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List indexed lectures
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "answer.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
