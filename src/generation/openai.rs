//! OpenAI chat completion implementation.

use super::{ChatMessage, Generator, Role};
use crate::error::{PensumError, Result};
use crate::openai::client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout for one chat completion request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI-based generator.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    /// Create a new generator for the given model.
    pub fn new(model: &str) -> Self {
        Self {
            client: client_with_timeout(REQUEST_TIMEOUT),
            model: model.to_string(),
            temperature: 0.7,
        }
    }

    fn convert(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let converted = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| PensumError::Generation(e.to_string()))?
                .into(),
        };
        Ok(converted)
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, messages), fields(count = messages.len()))]
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let converted: Vec<ChatCompletionRequestMessage> = messages
            .iter()
            .map(Self::convert)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(converted)
            .temperature(self.temperature)
            .build()
            .map_err(|e| PensumError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PensumError::Generation(format!("Chat API error: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| PensumError::Generation("Empty response from model".to_string()))?
            .clone();

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }
}
