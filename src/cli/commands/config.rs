//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut updated = settings;
            apply_setting(&mut updated, key, value)?;
            updated.save()?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::info(&format!(
                "Saved to {}",
                Settings::default_config_path().display()
            ));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment to the settings tree.
fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),
        "content.dir" => settings.content.dir = value.to_string(),
        "content.min_unit_chars" => settings.content.min_unit_chars = parse(key, value)?,
        "content.boilerplate_threshold" => {
            settings.content.boilerplate_threshold = parse(key, value)?
        }
        "embedding.provider" => settings.embedding.provider = value.to_string(),
        "embedding.model" => settings.embedding.model = value.to_string(),
        "embedding.dimensions" => settings.embedding.dimensions = parse(key, value)?,
        "embedding.max_retries" => settings.embedding.max_retries = parse(key, value)?,
        "retrieval.top_k" => settings.retrieval.top_k = parse(key, value)?,
        "retrieval.min_score" => settings.retrieval.min_score = parse(key, value)?,
        "retrieval.dedup_threshold" => settings.retrieval.dedup_threshold = parse(key, value)?,
        "answer.model" => settings.answer.model = value.to_string(),
        "answer.max_context_chars" => settings.answer.max_context_chars = parse(key, value)?,
        "answer.max_history_messages" => {
            settings.answer.max_history_messages = parse(key, value)?
        }
        "vector_store.provider" => settings.vector_store.provider = value.to_string(),
        "vector_store.sqlite_path" => settings.vector_store.sqlite_path = value.to_string(),
        "prompts.custom_dir" => settings.prompts.custom_dir = Some(value.to_string()),
        other => anyhow::bail!(
            "Unknown configuration key '{}'. Use 'pensum config show' to list keys.",
            other
        ),
    }
    Ok(())
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value '{}' for {}", value, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_string_setting() {
        let mut settings = Settings::default();
        apply_setting(&mut settings, "answer.model", "gpt-4o").unwrap();
        assert_eq!(settings.answer.model, "gpt-4o");
    }

    #[test]
    fn test_apply_numeric_setting() {
        let mut settings = Settings::default();
        apply_setting(&mut settings, "retrieval.top_k", "12").unwrap();
        assert_eq!(settings.retrieval.top_k, 12);

        apply_setting(&mut settings, "retrieval.min_score", "0.4").unwrap();
        assert!((settings.retrieval.min_score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut settings = Settings::default();
        assert!(apply_setting(&mut settings, "retrieval.nope", "1").is_err());
    }

    #[test]
    fn test_bad_value_is_rejected() {
        let mut settings = Settings::default();
        assert!(apply_setting(&mut settings, "retrieval.top_k", "many").is_err());
    }
}
