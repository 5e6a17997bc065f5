use super::{send_error, status_error};
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible `/embeddings` endpoint (OpenAI itself, LM Studio, vLLM).
pub struct OpenAiEmbedder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.unwrap_or_else(|| "text-embedding-3-small".to_string()),
        }
    }

    fn parse(body: &str) -> Result<Vec<f32>, DomainError> {
        let result: OpenAiResponse =
            serde_json::from_str(body).map_err(|e| DomainError::Embedding(format!("Parse error: {e}")))?;
        let vector = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| DomainError::Embedding("Response carried no embedding".into()))?;
        if vector.is_empty() {
            return Err(DomainError::Embedding("Empty embedding vector".into()));
        }
        Ok(vector)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let mut req = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&OpenAiRequest { model: &self.model, input: text });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(|e| send_error("OpenAI embeddings", e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| send_error("OpenAI embeddings", e))?;
        if !status.is_success() {
            return Err(status_error("OpenAI embeddings", status, &body));
        }
        Self::parse(&body)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
