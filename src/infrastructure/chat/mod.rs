use crate::domain::error::DomainError;
use crate::domain::ports::chat_port::{ChatMessage, ChatProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Chat completions against any OpenAI-compatible server.
pub struct OpenAiChat {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChat {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    fn parse(body: &str) -> Result<String, DomainError> {
        let resp: CompletionResponse =
            serde_json::from_str(body).map_err(|e| DomainError::Parse(format!("Chat response: {e}")))?;
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DomainError::Remote("Chat response had no content".into()))
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, DomainError> {
        let mut req = self.client.post(format!("{}/chat/completions", self.base_url)).json(&CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("Chat API error: {e}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DomainError::Remote(format!("Chat API {status}: {body}")));
        }
        Self::parse(&body)
    }
}
