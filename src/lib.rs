//! Pensum - Lecture Notes Search and Q&A
//!
//! A local-first CLI tool for indexing extracted lecture text and asking
//! questions about it.
//!
//! The name "Pensum" comes from the Norwegian/Scandinavian word for the
//! required reading of a course.
//!
//! # Overview
//!
//! Pensum allows you to:
//! - Index per-lecture text files into a searchable vector database
//! - Ask questions and get AI-powered answers with slide citations
//! - Search through your lecture notes semantically
//! - Hold an interactive study session with conversation context
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `loader` - Lecture artifact loading and segmentation
//! - `embedding` - Embedding generation
//! - `generation` - Answer text generation
//! - `vector_store` - Vector database abstraction
//! - `rag` - Retrieval and grounded answer synthesis
//! - `session` - Question/answer session with history
//! - `orchestrator` - Indexing pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use pensum::config::Settings;
//! use pensum::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Index one lecture's extracted text
//!     let result = orchestrator.build_lecture("lecture_03_indexing", false).await?;
//!     println!("Indexed {} units", result.units_indexed);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod loader;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod vector_store;

pub use error::{PensumError, Result};
