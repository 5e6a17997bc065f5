use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which backend answers semantic queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    RemoteGraph,
    LocalEmbedding,
    Keyword,
}

impl RetrievalMode {
    /// Startup mode: remote memory wins when enabled, then a usable local index,
    /// otherwise keyword scoring.
    pub fn initial(remote_enabled: bool, embedder_configured: bool, index_len: usize) -> Self {
        if remote_enabled {
            RetrievalMode::RemoteGraph
        } else if embedder_configured && index_len > 0 {
            RetrievalMode::LocalEmbedding
        } else {
            RetrievalMode::Keyword
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMode::RemoteGraph => write!(f, "remote_graph"),
            RetrievalMode::LocalEmbedding => write!(f, "local_embedding"),
            RetrievalMode::Keyword => write!(f, "keyword"),
        }
    }
}

impl FromStr for RetrievalMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote_graph" | "remote" | "graph" => Ok(RetrievalMode::RemoteGraph),
            "local_embedding" | "embedding" | "local" => Ok(RetrievalMode::LocalEmbedding),
            "keyword" => Ok(RetrievalMode::Keyword),
            _ => Err(format!("Unknown retrieval mode: {s}")),
        }
    }
}
