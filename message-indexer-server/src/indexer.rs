use ethers::prelude::Provider;
use message_indexer_logic::indexer::{settings::IndexerSettings, transport::RpcTransport, Indexer};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub async fn run(
    settings: IndexerSettings,
    db_connection: DatabaseConnection,
) -> Result<(), anyhow::Error> {
    tracing::info!("connecting to rpc");

    let transport = RpcTransport::new(settings.rpc_url.clone()).await?;
    let supports_subscriptions = transport.supports_subscriptions();
    let client = Provider::new(transport);

    let indexer = Indexer::new(client, Arc::new(db_connection), settings);

    tokio::spawn(async move {
        indexer
            .start(supports_subscriptions)
            .await
            .map_err(|err| {
                tracing::error!("failed to start indexer: {err}");
                err
            })
    });

    Ok(())
}
