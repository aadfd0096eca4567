//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{PensumError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Indexing requires an API key and a content directory.
    Index,
    /// Asking questions requires an API key.
    Ask,
    /// Search requires an API key (for the query embedding).
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Index => {
            check_api_key()?;
            check_content_dir(settings)?;
        }
        Operation::Ask | Operation::Search => {
            check_api_key()?;
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(PensumError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(PensumError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that the lecture content directory exists.
fn check_content_dir(settings: &Settings) -> Result<()> {
    let dir = settings.content_dir();
    if !dir.is_dir() {
        return Err(PensumError::Config(format!(
            "Content directory {} does not exist. Set content.dir in the config or create it and add lecture text files.",
            dir.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_content_dir_is_reported() {
        let mut settings = Settings::default();
        settings.content.dir = "/definitely/not/a/real/path".to_string();
        let err = check_content_dir(&settings).unwrap_err();
        assert!(matches!(err, PensumError::Config(_)));
    }

    #[test]
    fn test_existing_content_dir_passes() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.content.dir = dir.path().to_string_lossy().to_string();
        assert!(check_content_dir(&settings).is_ok());
    }
}
