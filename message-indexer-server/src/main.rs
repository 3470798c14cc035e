use blockscout_service_launcher::{database, launcher::ConfigSettings};
use message_indexer_server::{run_indexer, run_server, Settings};
use migration::Migrator;

const SERVICE_NAME: &str = "message_indexer";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let settings = Settings::build().expect("failed to read config");

    blockscout_service_launcher::tracing::init_logs(
        SERVICE_NAME,
        &settings.tracing,
        &settings.jaeger,
    )?;

    let db_connection = database::initialize_postgres::<Migrator>(&settings.database).await?;

    if let Some(indexer_settings) = settings.indexer.clone() {
        run_indexer(indexer_settings, db_connection.clone()).await?;
    }

    run_server(settings, db_connection).await
}
