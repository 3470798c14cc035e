//! Query access to the message index. The gateway either reads the local
//! entity store or round-trips to an external indexing service; callers see
//! the same request/result shape either way.

pub mod local;
pub mod remote;

pub use local::LocalGateway;
pub use remote::{RemoteGateway, RemoteGatewaySettings};

use crate::types::IndexedMessage;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// A domain query against the index, ordered by timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageQuery {
    pub limit: u64,
    pub sender_filter: Option<String>,
    pub direction: SortDirection,
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            sender_filter: None,
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    /// The network deadline was exceeded. Retrying (with backoff) is the
    /// caller's responsibility; the gateway never retries on its own.
    #[error("request deadline exceeded")]
    Timeout,
    /// Non-2xx status, a malformed response body, or a query-level error
    /// reported by the upstream service.
    #[error("upstream query failed: {0}")]
    Upstream(String),
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// A zero-length result is a valid response, not an error.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn query(&self, request: &MessageQuery) -> Result<Vec<IndexedMessage>, QueryError>;
}
