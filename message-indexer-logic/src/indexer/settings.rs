use super::mapper::PayloadPolicy;
use ethers::types::Address;
use serde::Deserialize;
use serde_with::serde_as;
use std::time;

#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct IndexerSettings {
    pub rpc_url: String,

    /// The message store contract whose logs are indexed.
    pub contract_address: Address,

    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    #[serde(default)]
    pub payload_policy: PayloadPolicy,

    #[serde(default)]
    pub realtime: RealtimeSettings,

    #[serde(default)]
    pub past_logs: PastLogsSettings,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RealtimeSettings {
    pub enabled: bool,

    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub polling_interval: time::Duration,

    pub polling_block_range: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PastLogsSettings {
    pub enabled: bool,

    /// How far behind the current head the startup catch-up reaches.
    pub block_range: u64,

    /// Upper bound on the block span of a single `eth_getLogs` call.
    pub batch_size: u64,
}

fn default_concurrency() -> u32 {
    10
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            rpc_url: "ws://127.0.0.1:8546".to_string(),
            contract_address: Address::zero(),
            concurrency: default_concurrency(),
            payload_policy: PayloadPolicy::default(),
            realtime: Default::default(),
            past_logs: Default::default(),
        }
    }
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            polling_interval: time::Duration::from_secs(6),
            polling_block_range: 6,
        }
    }
}

impl Default for PastLogsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            block_range: 0,
            batch_size: 1000,
        }
    }
}
