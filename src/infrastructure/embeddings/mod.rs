pub mod ollama;
pub mod openai;

use crate::domain::error::DomainError;
use reqwest::StatusCode;

/// Transport failures mean nothing else will get through either.
pub(crate) fn send_error(provider: &str, e: reqwest::Error) -> DomainError {
    if e.is_connect() || e.is_timeout() {
        DomainError::ProviderUnavailable(format!("{provider}: {e}"))
    } else {
        DomainError::Embedding(format!("{provider}: {e}"))
    }
}

pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> DomainError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            DomainError::ProviderUnavailable(format!("{provider} {status}: {body}"))
        }
        _ => DomainError::Embedding(format!("{provider} {status}: {body}")),
    }
}
