use blockscout_service_launcher::{
    database::{DatabaseConnectSettings, DatabaseSettings},
    launcher::{ConfigSettings, ServerSettings},
    tracing::{JaegerSettings, TracingSettings},
};
use message_indexer_logic::{gateway::RemoteGatewaySettings, indexer::settings::IndexerSettings};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub tracing: TracingSettings,
    #[serde(default)]
    pub jaeger: JaegerSettings,

    pub database: DatabaseSettings,

    /// Chain ingestion; disabled when absent (query-only deployment).
    pub indexer: Option<IndexerSettings>,

    /// When set, queries round-trip to the external indexing service
    /// instead of the local index.
    pub remote_gateway: Option<RemoteGatewaySettings>,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

fn default_max_page_size() -> u64 {
    100
}

impl ConfigSettings for Settings {
    const SERVICE_NAME: &'static str = "MESSAGE_INDEXER";
}

impl Settings {
    pub fn default(database_url: String) -> Self {
        Self {
            server: Default::default(),
            tracing: Default::default(),
            jaeger: Default::default(),
            database: DatabaseSettings {
                connect: DatabaseConnectSettings::Url(database_url),
                connect_options: Default::default(),
                create_database: Default::default(),
                run_migrations: Default::default(),
            },
            indexer: Some(Default::default()),
            remote_gateway: None,
            max_page_size: default_max_page_size(),
        }
    }
}
