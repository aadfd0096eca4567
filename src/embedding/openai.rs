//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{PensumError, Result};
use crate::openai::client_with_timeout;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Timeout for one embedding batch request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-based embedder with bounded retry on transient failures.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    max_retries: u32,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with default settings.
    pub fn new() -> Self {
        Self::with_config("text-embedding-3-small", 1536, 3)
    }

    /// Create a new OpenAI embedder with custom model, dimensions and retry budget.
    pub fn with_config(model: &str, dimensions: usize, max_retries: u32) -> Self {
        Self {
            client: client_with_timeout(REQUEST_TIMEOUT),
            model: model.to_string(),
            dimensions,
            max_retries,
        }
    }

    /// Send one batch to the embeddings API, retrying transient failures
    /// with exponential backoff (1s, 2s, 4s, ...) before surfacing the error.
    async fn embed_batch_with_retry(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = input.len();
        let mut last_err: Option<PensumError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                warn!("Embedding attempt {} failed, retrying in {:?}", attempt, delay);
                tokio::time::sleep(delay).await;
            }

            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(input.clone()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| PensumError::Embedding(format!("Failed to build request: {}", e)))?;

            match self.client.embeddings().create(request).await {
                Ok(response) => {
                    // Sort by index to ensure input order is preserved
                    let mut data: Vec<_> = response.data.into_iter().collect();
                    data.sort_by_key(|e| e.index);

                    let embeddings: Vec<Vec<f32>> =
                        data.into_iter().map(|e| e.embedding).collect();

                    if embeddings.len() != expected {
                        return Err(PensumError::Embedding(format!(
                            "Embedding API returned {} vectors for {} inputs",
                            embeddings.len(),
                            expected
                        )));
                    }
                    if let Some(v) = embeddings.iter().find(|v| v.len() != self.dimensions) {
                        return Err(PensumError::Embedding(format!(
                            "Embedding API returned a {}-dimensional vector, expected {}",
                            v.len(),
                            self.dimensions
                        )));
                    }

                    return Ok(embeddings);
                }
                Err(e) => {
                    last_err = Some(PensumError::Embedding(format!(
                        "Embedding API error: {}",
                        e
                    )));
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| PensumError::Embedding("Embedding failed after retries".into())))
    }
}

impl Default for OpenAIEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_many(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| PensumError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // The API caps batch size, process in chunks
        const BATCH_SIZE: usize = 100;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let batch = self.embed_batch_with_retry(chunk.to_vec()).await?;
            all_embeddings.extend(batch);
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
