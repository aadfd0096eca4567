//! Shared OpenAI client construction.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Build an OpenAI client whose requests time out after `timeout`.
///
/// The API key and base URL come from the standard OPENAI_API_KEY and
/// OPENAI_API_BASE environment variables.
pub fn client_with_timeout(timeout: Duration) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}
