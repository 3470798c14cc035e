use async_trait::async_trait;
use ethers::{
    prelude::{Http, JsonRpcClient, ProviderError, PubsubClient, Ws},
    types::U256,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, str::FromStr};

#[cfg(test)]
use ethers::providers::MockProvider;

/// JSON-RPC transport selected from the configured url scheme. Websocket
/// transports additionally support log subscriptions; http transports fall
/// back to polling.
#[derive(Clone, Debug)]
pub enum RpcTransport {
    Ws(Ws),
    Http(Http),
    #[cfg(test)]
    Mock(MockProvider),
}

impl RpcTransport {
    pub async fn new(rpc_url: String) -> Result<Self, ProviderError> {
        if is_websocket_url(&rpc_url) {
            // No reconnect attempts: a dropped subscription may have lost
            // events, so the whole indexer restarts and catches up instead.
            let ws = Ws::connect_with_reconnects(rpc_url, 0).await?;
            Ok(Self::Ws(ws))
        } else {
            let http =
                Http::from_str(&rpc_url).map_err(|e| ProviderError::CustomError(e.to_string()))?;
            Ok(Self::Http(http))
        }
    }

    pub fn supports_subscriptions(&self) -> bool {
        matches!(self, RpcTransport::Ws(_))
    }
}

fn is_websocket_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("ws://") || url.starts_with("wss://")
}

#[async_trait]
impl JsonRpcClient for RpcTransport {
    type Error = ProviderError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        match self {
            RpcTransport::Ws(ws) => ws.request(method, params).await.map_err(ProviderError::from),
            RpcTransport::Http(http) => http
                .request(method, params)
                .await
                .map_err(ProviderError::from),
            #[cfg(test)]
            RpcTransport::Mock(mock) => mock
                .request(method, params)
                .await
                .map_err(ProviderError::from),
        }
    }
}

impl PubsubClient for RpcTransport {
    type NotificationStream = <Ws as PubsubClient>::NotificationStream;

    fn subscribe<T: Into<U256>>(&self, id: T) -> Result<Self::NotificationStream, Self::Error> {
        match self {
            RpcTransport::Ws(ws) => ws.subscribe(id).map_err(ProviderError::from),
            _ => Err(ProviderError::UnsupportedRPC),
        }
    }

    fn unsubscribe<T: Into<U256>>(&self, id: T) -> Result<(), Self::Error> {
        match self {
            RpcTransport::Ws(ws) => ws.unsubscribe(id).map_err(ProviderError::from),
            _ => Err(ProviderError::UnsupportedRPC),
        }
    }
}
