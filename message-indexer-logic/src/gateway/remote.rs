use super::{MessageGateway, MessageQuery, QueryError, SortDirection};
use crate::types::IndexedMessage;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use serde_with::serde_as;
use std::time::Duration;
use url::Url;

const MESSAGES_QUERY: &str = r#"query RecentMessages($limit: Int!, $direction: String!, $sender: String) {
  messages(first: $limit, orderBy: timestamp, orderDirection: $direction, where: { sender: $sender }) {
    id
    sender
    message
    timestamp
  }
}"#;

#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RemoteGatewaySettings {
    pub endpoint: Url,

    /// Sent as a bearer token when the endpoint requires authentication.
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub request_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Gateway backed by an external indexing service speaking the
/// `{ query, variables }` POST protocol.
pub struct RemoteGateway {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl RemoteGateway {
    pub fn new(settings: RemoteGatewaySettings) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint,
            api_key: settings.api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseData {
    #[serde(default)]
    messages: Vec<RemoteMessage>,
}

#[derive(Debug, Deserialize)]
struct RemoteMessage {
    id: String,
    sender: String,
    message: String,
    // big-integer fields arrive as strings
    timestamp: String,
}

impl TryFrom<RemoteMessage> for IndexedMessage {
    type Error = QueryError;

    fn try_from(remote: RemoteMessage) -> Result<Self, QueryError> {
        let timestamp = remote.timestamp.parse().map_err(|_| {
            QueryError::Upstream(format!(
                "entity {} carries a non-numeric timestamp",
                remote.id
            ))
        })?;
        Ok(Self {
            id: remote.id,
            sender: remote.sender,
            message: remote.message,
            timestamp,
        })
    }
}

#[async_trait]
impl MessageGateway for RemoteGateway {
    async fn query(&self, request: &MessageQuery) -> Result<Vec<IndexedMessage>, QueryError> {
        let direction = match request.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        let body = json!({
            "query": MESSAGES_QUERY,
            "variables": {
                "limit": request.limit,
                "direction": direction,
                "sender": request.sender_filter,
            },
        });

        let mut http_request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Upstream(format!(
                "unexpected status {status}"
            )));
        }

        let payload: QueryResponse = response.json().await.map_err(transport_error)?;
        if !payload.errors.is_empty() {
            // query-level errors always fail the request, whatever the status
            return Err(QueryError::Upstream(format!(
                "query returned errors: {}",
                serde_json::Value::Array(payload.errors)
            )));
        }

        payload
            .data
            .unwrap_or_default()
            .messages
            .into_iter()
            .map(IndexedMessage::try_from)
            .collect()
    }
}

fn transport_error(err: reqwest::Error) -> QueryError {
    if err.is_timeout() {
        QueryError::Timeout
    } else {
        QueryError::Upstream(err.to_string())
    }
}
