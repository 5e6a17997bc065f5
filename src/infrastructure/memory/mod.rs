use crate::domain::error::DomainError;
use crate::domain::ports::memory_service::MemoryService;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Graph memory service reached over HTTP JSON. Each verb is a `POST` to
/// `{base}/{verb}`.
pub struct HttpMemoryService {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    data: &'a str,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query_text: &'a str,
    query_type: &'static str,
    top_k: usize,
}

impl HttpMemoryService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, verb: &str, body: &T) -> Result<Value, DomainError> {
        let resp = self
            .client
            .post(format!("{}/{verb}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("memory {verb}: {e}")))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DomainError::Remote(format!("memory {verb} {status}: {text}")));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| DomainError::Parse(format!("memory {verb}: {e}")))
    }

    /// Search results come back as a list of strings or of objects; objects are
    /// flattened to their JSON text.
    fn results_to_strings(value: Value) -> Vec<String> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("results") {
                Some(Value::Array(items)) => items,
                _ => vec![Value::Object(obj)],
            },
            Value::Null => Vec::new(),
            other => vec![other],
        };
        items
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl MemoryService for HttpMemoryService {
    async fn ingest(&self, text: &str) -> Result<(), DomainError> {
        self.post("add", &AddRequest { data: text }).await.map(|_| ())
    }

    async fn consolidate(&self) -> Result<(), DomainError> {
        self.post("cognify", &serde_json::json!({})).await?;
        self.post("memify", &serde_json::json!({})).await?;
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>, DomainError> {
        let value = self
            .post(
                "search",
                &SearchRequest { query_text: query, query_type: "GRAPH_COMPLETION", top_k },
            )
            .await?;
        Ok(Self::results_to_strings(value))
    }

    async fn reset(&self) -> Result<(), DomainError> {
        self.post("prune", &serde_json::json!({})).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_results() {
        let out = HttpMemoryService::results_to_strings(json!(["a", "b"]));
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn test_wrapped_object_results() {
        let out = HttpMemoryService::results_to_strings(json!({"results": [{"text": "x"}, "y"]}));
        assert_eq!(out, vec![r#"{"text":"x"}"#.to_string(), "y".to_string()]);
    }

    #[test]
    fn test_null_results() {
        assert!(HttpMemoryService::results_to_strings(Value::Null).is_empty());
    }
}
