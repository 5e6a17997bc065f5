use crate::domain::error::DomainError;
use crate::domain::values::cost_basis::OversellPolicy;
use crate::domain::values::retrieval_mode::RetrievalMode;

pub const DEFAULT_DB_PATH: &str = "data/trading.db";
pub const DEFAULT_LLM_BASE_URL: &str = "http://127.0.0.1:1234/v1";
pub const DEFAULT_CHAT_MODEL: &str = "qwen/qwen3-vl-4b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingKind {
    Ollama,
    OpenAi,
    None,
}

impl EmbeddingKind {
    fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(EmbeddingKind::Ollama),
            "openai" => Ok(EmbeddingKind::OpenAi),
            "" | "none" | "off" => Ok(EmbeddingKind::None),
            other => Err(DomainError::Config(format!("unknown embedding provider: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub llm_base_url: String,
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embedding: EmbeddingKind,
    pub embedding_model: Option<String>,
    /// Falls back to the provider's usual local address when unset.
    pub embedding_base_url: Option<String>,
    pub memory_url: Option<String>,
    pub memory_enabled: bool,
    pub forced_mode: Option<RetrievalMode>,
    pub oversell: OversellPolicy,
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, DomainError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let memory_url = get("TRADEMIND_MEMORY_URL");
        let memory_enabled = match get("TRADEMIND_MEMORY_ENABLED") {
            Some(flag) => parse_flag(&flag)?,
            None => memory_url.is_some(),
        };
        if memory_enabled && memory_url.is_none() {
            return Err(DomainError::Config("TRADEMIND_MEMORY_ENABLED is set but TRADEMIND_MEMORY_URL is not".into()));
        }

        let forced_mode = get("TRADEMIND_RETRIEVAL_MODE")
            .map(|m| m.parse::<RetrievalMode>().map_err(DomainError::Config))
            .transpose()?;
        let oversell = match get("TRADEMIND_OVERSELL").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("ignore") => OversellPolicy::Ignore,
            Some("reject") => OversellPolicy::Reject,
            Some(other) => return Err(DomainError::Config(format!("unknown oversell policy: {other}"))),
        };

        Ok(Self {
            db_path: get("TRADEMIND_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            llm_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            api_key: get("OPENAI_API_KEY"),
            chat_model: get("TRADEMIND_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embedding: EmbeddingKind::parse(&get("TRADEMIND_EMBEDDING_PROVIDER").unwrap_or_default())?,
            embedding_model: get("TRADEMIND_EMBEDDING_MODEL"),
            embedding_base_url: get("TRADEMIND_EMBEDDING_BASE_URL"),
            memory_url,
            memory_enabled,
            forced_mode,
            oversell,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool, DomainError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DomainError::Config(format!("not a boolean: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, DomainError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.db_path, DEFAULT_DB_PATH);
        assert_eq!(c.llm_base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(c.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(c.embedding, EmbeddingKind::None);
        assert!(!c.memory_enabled);
        assert_eq!(c.forced_mode, None);
        assert_eq!(c.oversell, OversellPolicy::Ignore);
    }

    #[test]
    fn test_memory_url_enables_memory() {
        let c = config(&[("TRADEMIND_MEMORY_URL", "http://localhost:8000")]).unwrap();
        assert!(c.memory_enabled);
        let c = config(&[("TRADEMIND_MEMORY_URL", "http://localhost:8000"), ("TRADEMIND_MEMORY_ENABLED", "false")]).unwrap();
        assert!(!c.memory_enabled);
    }

    #[test]
    fn test_memory_enabled_without_url_is_error() {
        assert!(config(&[("TRADEMIND_MEMORY_ENABLED", "true")]).is_err());
    }

    #[test]
    fn test_provider_and_mode_parsing() {
        let c = config(&[
            ("TRADEMIND_EMBEDDING_PROVIDER", "Ollama"),
            ("TRADEMIND_RETRIEVAL_MODE", "keyword"),
            ("TRADEMIND_OVERSELL", "REJECT"),
        ])
        .unwrap();
        assert_eq!(c.embedding, EmbeddingKind::Ollama);
        assert_eq!(c.forced_mode, Some(RetrievalMode::Keyword));
        assert_eq!(c.oversell, OversellPolicy::Reject);
        assert!(config(&[("TRADEMIND_EMBEDDING_PROVIDER", "voyage")]).is_err());
    }
}
