//! Per-request transaction inspection lifecycle.
//!
//! Each inspection walks `Idle → Loading → {Success, Failed}`. A placeholder
//! view is published the moment a request is submitted, so callers never
//! observe an undefined view, and every request carries an identity token:
//! whichever request was issued last wins, regardless of completion order.

use crate::{
    gateway::{MessageGateway, MessageQuery, QueryError, SortDirection},
    normalizer::{self, TransactionSource},
    types::{TransactionStatus, TransactionView},
};
use async_trait::async_trait;
use ethers::{prelude::Middleware, types::H256};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use thiserror::Error;
use tokio::{sync::RwLock, time::timeout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Success,
    Failed,
}

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("request deadline exceeded")]
    Timeout,
    #[error("upstream lookup failed: {0}")]
    Upstream(String),
    /// A valid request with no matching transaction. Lands in the same
    /// `Failed` state as the network errors but stays distinguishable here
    /// and in the logs.
    #[error("transaction not found")]
    NotFound,
}

impl From<QueryError> for InspectError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Timeout => Self::Timeout,
            other => Self::Upstream(other.to_string()),
        }
    }
}

/// A transaction lookup backend: the live node or the query gateway.
#[async_trait]
pub trait TransactionLookup: Send + Sync {
    async fn lookup(&self, hash: H256) -> Result<TransactionSource, InspectError>;
}

/// Looks the transaction up on a live node. Block context (latest block
/// number, block timestamp) is enrichment: when it cannot be fetched the
/// view degrades to zero confirmations instead of failing the inspection.
pub struct ProviderLookup<M> {
    client: M,
}

impl<M> ProviderLookup<M> {
    pub fn new(client: M) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<M: Middleware + 'static> TransactionLookup for ProviderLookup<M> {
    async fn lookup(&self, hash: H256) -> Result<TransactionSource, InspectError> {
        let transaction = self
            .client
            .get_transaction(hash)
            .await
            .map_err(upstream)?
            .ok_or(InspectError::NotFound)?;
        let receipt = self
            .client
            .get_transaction_receipt(hash)
            .await
            .map_err(upstream)?;

        let latest_block = match self.client.get_block_number().await {
            Ok(number) => Some(number.as_u64()),
            Err(err) => {
                tracing::debug!(error = %err, "latest block unavailable, confirmations degrade to 0");
                None
            }
        };
        let block_timestamp = match transaction.block_number {
            Some(number) => self
                .client
                .get_block(number.as_u64())
                .await
                .ok()
                .flatten()
                .map(|block| block.timestamp.low_u64() as i64),
            None => None,
        };

        Ok(TransactionSource::Provider {
            transaction,
            receipt,
            latest_block,
            block_timestamp,
        })
    }
}

fn upstream<E: std::fmt::Display>(err: E) -> InspectError {
    InspectError::Upstream(err.to_string())
}

/// Looks the transaction up in the message index through a gateway. The
/// query shape has no id filter, so a bounded recent window is scanned for
/// an entity whose id belongs to the requested transaction.
pub struct GatewayLookup<G> {
    gateway: G,
    scan_limit: u64,
}

impl<G> GatewayLookup<G> {
    pub fn new(gateway: G, scan_limit: u64) -> Self {
        Self {
            gateway,
            scan_limit,
        }
    }
}

#[async_trait]
impl<G: MessageGateway> TransactionLookup for GatewayLookup<G> {
    async fn lookup(&self, hash: H256) -> Result<TransactionSource, InspectError> {
        let request = MessageQuery {
            limit: self.scan_limit,
            sender_filter: None,
            direction: SortDirection::Desc,
        };
        let messages = self.gateway.query(&request).await?;

        let id_prefix = format!("{hash:#x}-");
        messages
            .into_iter()
            .find(|msg| msg.id.starts_with(&id_prefix))
            .map(TransactionSource::Indexed)
            .ok_or(InspectError::NotFound)
    }
}

struct ViewSlot {
    state: FetchState,
    view: TransactionView,
}

/// Drives the fetch lifecycle. One value serves many sequential or competing
/// requests; each request gets its own token and its own fresh view.
pub struct Inspector<L> {
    lookup: L,
    request_timeout: Duration,
    latest_request: AtomicU64,
    slot: RwLock<ViewSlot>,
}

impl<L: TransactionLookup> Inspector<L> {
    pub fn new(lookup: L, request_timeout: Duration) -> Self {
        Self {
            lookup,
            request_timeout,
            latest_request: AtomicU64::new(0),
            slot: RwLock::new(ViewSlot {
                state: FetchState::Idle,
                view: TransactionView::placeholder(),
            }),
        }
    }

    pub async fn state(&self) -> FetchState {
        self.slot.read().await.state
    }

    /// A consistent snapshot of the current view. Always complete and
    /// well-typed, even before anything has succeeded.
    pub async fn view(&self) -> TransactionView {
        self.slot.read().await.view.clone()
    }

    /// Returns to `Idle` and restores the placeholder. Valid from any state;
    /// any in-flight request is invalidated.
    pub async fn reset(&self) {
        self.latest_request.fetch_add(1, Ordering::SeqCst);
        let mut slot = self.slot.write().await;
        slot.state = FetchState::Idle;
        slot.view = TransactionView::placeholder();
    }

    /// Submits an inspection request for `hash` and drives it to completion.
    /// The published view switches to the loading placeholder immediately;
    /// the lookup is bounded by the configured timeout.
    pub async fn inspect(&self, hash: H256) -> FetchState {
        let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut slot = self.slot.write().await;
            // a newer request may already have been issued
            if self.latest_request.load(Ordering::SeqCst) == token {
                slot.state = FetchState::Loading;
                slot.view = TransactionView::placeholder();
            }
        }

        let outcome = match timeout(self.request_timeout, self.lookup.lookup(hash)).await {
            Ok(result) => result,
            Err(_) => Err(InspectError::Timeout),
        };
        self.commit(token, hash, outcome).await
    }

    async fn commit(
        &self,
        token: u64,
        hash: H256,
        outcome: Result<TransactionSource, InspectError>,
    ) -> FetchState {
        let mut slot = self.slot.write().await;
        if self.latest_request.load(Ordering::SeqCst) != token {
            tracing::debug!(tx_hash = ?hash, "stale inspection result discarded");
            return slot.state;
        }

        match outcome {
            Ok(source) => {
                slot.view = normalizer::normalize(source);
                slot.state = FetchState::Success;
            }
            Err(err) => {
                match &err {
                    InspectError::NotFound => {
                        tracing::info!(tx_hash = ?hash, "transaction not found")
                    }
                    other => {
                        tracing::error!(tx_hash = ?hash, error = %other, "transaction lookup failed")
                    }
                }
                let mut view = TransactionView::placeholder();
                view.status = TransactionStatus::Failed;
                view.status_label = TransactionStatus::Failed.label().to_string();
                slot.view = view;
                slot.state = FetchState::Failed;
            }
        }
        slot.state
    }
}
