pub mod mapper;
pub mod settings;
pub mod transport;

use crate::{
    repository,
    types::{InvalidEvent, RawEvent},
};
use ethers::{
    contract::EthEvent,
    prelude::{Middleware, Provider},
    types::{Filter, Log},
};
use futures::{
    stream::{self, repeat_with, BoxStream},
    Stream, StreamExt,
};
use mapper::MessageStoredFilter;
use sea_orm::DatabaseConnection;
use settings::IndexerSettings;
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::instrument;
use transport::RpcTransport;

#[derive(Debug)]
enum ProcessLogError {
    Invalid(InvalidEvent),
    Storage(anyhow::Error),
}

impl From<InvalidEvent> for ProcessLogError {
    fn from(err: InvalidEvent) -> Self {
        Self::Invalid(err)
    }
}

/// Ingests `MessageStored` logs into the entity store. Upstream delivery is
/// at-least-once (overlapping poll windows, restarts, re-orgs of the
/// subscription), so everything downstream relies on the write-once upsert
/// rather than on seeing each log exactly once.
pub struct Indexer {
    client: Provider<RpcTransport>,

    db: Arc<DatabaseConnection>,

    settings: IndexerSettings,
}

impl Indexer {
    pub fn new(
        client: Provider<RpcTransport>,
        db: Arc<DatabaseConnection>,
        settings: IndexerSettings,
    ) -> Self {
        Self {
            client,
            db,
            settings,
        }
    }

    #[instrument(name = "indexer", skip_all, level = "info")]
    pub async fn start(&self, supports_subscriptions: bool) -> anyhow::Result<()> {
        let mut stream_logs = stream::SelectAll::<BoxStream<Log>>::new();

        if self.settings.realtime.enabled {
            if supports_subscriptions {
                tracing::info!("subscribing to MessageStored logs from rpc");
                let realtime = self.client.subscribe_logs(&self.logs_filter()).await?;
                stream_logs.push(Box::pin(realtime));
            } else {
                tracing::info!("starting polling of MessageStored logs from rpc");
                stream_logs.push(Box::pin(self.poll_for_logs()));
            }
        }

        if self.settings.past_logs.enabled {
            tracing::debug!("fetching latest block number");
            let block_number = self.client.get_block_number().await?.as_u64();
            let from_block = block_number.saturating_sub(self.settings.past_logs.block_range);
            let logs = self.fetch_logs_in_range(from_block, block_number).await?;
            stream_logs.push(Box::pin(stream::iter(logs)));
        }

        stream_logs
            .for_each_concurrent(Some(self.settings.concurrency as usize), |log| async move {
                self.handle_log(log).await
            })
            .await;

        Ok(())
    }

    fn logs_filter(&self) -> Filter {
        Filter::new()
            .address(self.settings.contract_address)
            .topic0(MessageStoredFilter::signature())
    }

    async fn fetch_logs_in_range(&self, from_block: u64, to_block: u64) -> anyhow::Result<Vec<Log>> {
        let mut logs = vec![];
        let mut batch_from = from_block;
        while batch_from <= to_block {
            let batch_to = to_block.min(batch_from.saturating_add(self.settings.past_logs.batch_size));
            let filter = self.logs_filter().from_block(batch_from).to_block(batch_to);
            logs.append(&mut self.client.get_logs(&filter).await?);
            tracing::info!(
                from_block = batch_from,
                to_block = batch_to,
                count = logs.len(),
                "fetched past MessageStored logs"
            );
            batch_from = batch_to + 1;
        }
        Ok(logs)
    }

    fn poll_for_logs(&self) -> impl Stream<Item = Log> + '_ {
        repeat_with(|| async {
            sleep(self.settings.realtime.polling_interval).await;
            let block_number = self.client.get_block_number().await?.as_u64();
            let from_block = block_number.saturating_sub(self.settings.realtime.polling_block_range);
            let filter = self
                .logs_filter()
                .from_block(from_block)
                .to_block(block_number);
            self.client.get_logs(&filter).await
        })
        .filter_map(|fut| async {
            fut.await
                .map_err(|err| tracing::error!(error = ?err, "failed to poll for logs"))
                .ok()
        })
        .flat_map(stream::iter)
    }

    async fn handle_log(&self, log: Log) {
        let mut backoff = vec![5, 20].into_iter().map(Duration::from_secs);
        loop {
            match self.process_log(&log).await {
                Ok(()) => break,
                Err(ProcessLogError::Invalid(err)) => {
                    // per-item failure: the event is dropped, ingestion goes on
                    tracing::error!(
                        error = ?err,
                        tx_hash = ?log.transaction_hash,
                        log_index = ?log.log_index,
                        "skipping malformed event"
                    );
                    break;
                }
                Err(ProcessLogError::Storage(err)) => match backoff.next() {
                    Some(delay) => {
                        tracing::warn!(error = ?err, ?delay, "failed to store message, retrying");
                        sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            error = ?err,
                            tx_hash = ?log.transaction_hash,
                            "failed to store message, skipping"
                        );
                        break;
                    }
                },
            }
        }
    }

    async fn process_log(&self, log: &Log) -> Result<(), ProcessLogError> {
        let event = RawEvent::from_log(log)?;
        let message = mapper::map(&event, self.settings.payload_policy)?;
        let id = message.id.clone();

        let inserted = repository::messages::upsert(self.db.as_ref(), message)
            .await
            .map_err(ProcessLogError::Storage)?;
        if inserted {
            tracing::info!(%id, "indexed message");
        } else {
            tracing::debug!(%id, "duplicate event, message already indexed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::init_db;
    use ethers::{providers::MockProvider, types::{Address, H256}};
    use super::mapper::tests::message_stored_log;
    use pretty_assertions::assert_eq;
    use sea_orm::Order;

    fn test_indexer(db: Arc<DatabaseConnection>) -> Indexer {
        let client = Provider::new(RpcTransport::Mock(MockProvider::new()));
        Indexer::new(client, db, IndexerSettings::default())
    }

    #[tokio::test]
    async fn process_log_maps_and_stores_the_event() {
        let db = Arc::new(init_db().await);
        let indexer = test_indexer(db.clone());

        let sender = Address::repeat_byte(0x51);
        let log = message_stored_log(H256::repeat_byte(0xab), 0, sender, b"Hello", 100);
        indexer.process_log(&log).await.unwrap();

        let stored = repository::messages::find_recent(&db, 10, None, Order::Desc)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, format!("{:#x}-0", H256::repeat_byte(0xab)));
        assert_eq!(stored[0].message, "Hello");
        assert_eq!(stored[0].timestamp, 100);
    }

    #[tokio::test]
    async fn replayed_log_is_a_silent_no_op() {
        let db = Arc::new(init_db().await);
        let indexer = test_indexer(db.clone());

        let log = message_stored_log(
            H256::repeat_byte(0xab),
            0,
            Address::repeat_byte(0x51),
            b"Hello",
            100,
        );
        for _ in 0..3 {
            indexer.process_log(&log).await.unwrap();
        }

        let stored = repository::messages::find_recent(&db, 10, None, Order::Desc)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn malformed_event_is_fatal_to_that_event_only() {
        let db = Arc::new(init_db().await);
        let indexer = test_indexer(db.clone());

        let mut pending = message_stored_log(
            H256::repeat_byte(0xaa),
            0,
            Address::repeat_byte(0x51),
            b"lost",
            90,
        );
        pending.transaction_hash = None;
        // handle_log must swallow the error without retry loops
        indexer.handle_log(pending).await;

        let good = message_stored_log(
            H256::repeat_byte(0xab),
            1,
            Address::repeat_byte(0x52),
            b"World",
            100,
        );
        indexer.handle_log(good).await;

        let stored = repository::messages::find_recent(&db, 10, None, Order::Desc)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].message, "World");
    }

    #[tokio::test]
    async fn tie_on_timestamp_is_broken_by_id_ascending() {
        let db = Arc::new(init_db().await);
        let indexer = test_indexer(db.clone());

        let sender_one = Address::repeat_byte(0x51);
        let sender_two = Address::repeat_byte(0x52);
        let tx_hash = H256::repeat_byte(0xab);
        // same transaction, same block timestamp, two consecutive log indexes
        indexer
            .process_log(&message_stored_log(tx_hash, 1, sender_two, b"World", 100))
            .await
            .unwrap();
        indexer
            .process_log(&message_stored_log(tx_hash, 0, sender_one, b"Hello", 100))
            .await
            .unwrap();

        let stored = repository::messages::find_recent(&db, 2, None, Order::Desc)
            .await
            .unwrap();
        let ids: Vec<_> = stored.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                format!("{tx_hash:#x}-0").as_str(),
                format!("{tx_hash:#x}-1").as_str()
            ]
        );
        assert_eq!(stored[0].message, "Hello");
        assert_eq!(stored[1].message, "World");
    }
}
