//! Configuration management for Pensum.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts};
pub use settings::{
    AnswerSettings, ContentSettings, EmbeddingSettings, GeneralSettings, PromptSettings,
    RetrievalSettings, Settings, VectorStoreSettings,
};
