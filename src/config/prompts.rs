//! Prompt templates for Pensum.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub answer: AnswerPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for grounded answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub system: String,
    pub user: String,
    pub chat_system: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful course tutor that answers questions based on lecture material from the student's notes.

Guidelines:
- Answer questions using only the provided excerpts from the lecture notes
- Always cite your sources with lecture names and slide numbers
- Use the format [Lecture, slide N] for citations
- If the excerpts don't fully address the question, say what is covered and what is missing
- Be concise but thorough in your responses
- When multiple excerpts are relevant, synthesize information across them"#
                .to_string(),

            user: r#"Question: {{question}}

Relevant excerpts from the lecture notes:

{{context}}

Please answer the question based on the above excerpts."#
                .to_string(),

            chat_system: r#"You are a helpful course tutor having a study conversation with a student. You have access to excerpts from the student's lecture notes.

In this conversation:
- Answer questions using the lecture excerpts provided with each question
- Remember previous questions in the conversation for follow-ups
- Cite sources with [Lecture, slide N] format
- Encourage follow-up questions and keep a friendly tutoring tone
- If asked about something not covered in the notes, say so honestly"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let answer_path = custom_path.join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
