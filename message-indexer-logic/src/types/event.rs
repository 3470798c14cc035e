use crate::codec::HexError;
use ethers::types::{Address, H256};
use thiserror::Error;

/// An on-chain `MessageStored` log event in wire form, before it is mapped
/// into a durable entity. Produced exactly once per log; never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub transaction_hash: H256,
    /// Unique within a transaction.
    pub log_index: u64,
    pub sender: Address,
    /// `0x`-prefixed hex of the message bytes, UTF-8 text encoded one byte
    /// per character.
    pub payload: String,
    /// Seconds since epoch.
    pub block_timestamp: i64,
}

/// A malformed upstream event. Fatal to that single event only: the mapper
/// neither retries nor guesses, and ingestion continues with the next log.
#[derive(Debug, Error)]
pub enum InvalidEvent {
    #[error("unexpected pending log")]
    PendingLog,
    #[error("log does not decode as a MessageStored event: {0}")]
    UndecodableLog(String),
    #[error("event timestamp does not fit the stored range")]
    TimestampOutOfRange,
    #[error("payload is not valid hex text: {0}")]
    BadPayload(#[from] HexError),
}
