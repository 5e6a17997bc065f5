use super::{send_error, status_error};
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .unwrap_or_else(|| "http://localhost:11434".to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| "nomic-embed-text".to_string()),
        }
    }

    fn parse(body: &str) -> Result<Vec<f32>, DomainError> {
        let result: OllamaResponse =
            serde_json::from_str(body).map_err(|e| DomainError::Embedding(format!("Parse error: {e}")))?;
        if result.embedding.is_empty() {
            return Err(DomainError::Embedding("Empty embedding vector".into()));
        }
        Ok(result.embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let resp = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&OllamaRequest { model: &self.model, prompt: text })
            .send()
            .await
            .map_err(|e| send_error("Ollama", e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| send_error("Ollama", e))?;
        if !status.is_success() {
            return Err(status_error("Ollama", status, &body));
        }
        Self::parse(&body)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
