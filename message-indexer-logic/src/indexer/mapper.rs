use crate::{
    codec,
    types::{IndexedMessage, InvalidEvent, RawEvent},
};
use ethers::{
    contract::{parse_log, EthEvent},
    types::{Address, Bytes, Log, U256},
};
use serde::Deserialize;

/// `MessageStored(address indexed sender, bytes payload, uint256 timestamp)`
/// as emitted by the message store contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, EthEvent)]
#[ethevent(
    name = "MessageStored",
    abi = "MessageStored(address,bytes,uint256)"
)]
pub struct MessageStoredFilter {
    #[ethevent(indexed)]
    pub sender: Address,
    pub payload: Bytes,
    pub timestamp: U256,
}

/// How the mapper turns an event payload into the stored `message`. The store
/// itself is agnostic: it persists whatever the mapper hands it.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayloadPolicy {
    /// Decode the hex payload to text before storing.
    #[default]
    Decode,
    /// Store the `0x`-prefixed hex payload verbatim.
    Raw,
}

impl RawEvent {
    /// Extracts a [`RawEvent`] from a mined `MessageStored` log. Pending or
    /// reorged-out logs are rejected.
    pub fn from_log(log: &Log) -> Result<Self, InvalidEvent> {
        if log.removed == Some(true) {
            return Err(InvalidEvent::PendingLog);
        }
        let transaction_hash = log.transaction_hash.ok_or(InvalidEvent::PendingLog)?;
        let log_index = log.log_index.ok_or(InvalidEvent::PendingLog)?.as_u64();

        let event = parse_log::<MessageStoredFilter>(log.clone())
            .map_err(|err| InvalidEvent::UndecodableLog(err.to_string()))?;
        if event.timestamp > U256::from(i64::MAX) {
            return Err(InvalidEvent::TimestampOutOfRange);
        }

        Ok(Self {
            transaction_hash,
            log_index,
            sender: event.sender,
            payload: format!("0x{}", hex::encode(&event.payload)),
            block_timestamp: event.timestamp.as_u64() as i64,
        })
    }
}

/// Maps a raw event into its durable entity. Deterministic and
/// side-effect-free: the id is derived from `(transaction_hash, log_index)`,
/// so the same event always maps to the same entity.
pub fn map(event: &RawEvent, policy: PayloadPolicy) -> Result<IndexedMessage, InvalidEvent> {
    let message = match policy {
        PayloadPolicy::Decode => codec::decode(&event.payload)?,
        PayloadPolicy::Raw => event.payload.clone(),
    };

    Ok(IndexedMessage {
        id: IndexedMessage::derive_id(event.transaction_hash, event.log_index),
        sender: format!("{:#x}", event.sender),
        message,
        timestamp: event.block_timestamp,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ethers::{abi::Token, types::H256};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    pub fn sender_topic(sender: Address) -> H256 {
        let mut topic = H256::zero();
        topic.0[12..].copy_from_slice(sender.as_bytes());
        topic
    }

    pub fn message_stored_log(
        transaction_hash: H256,
        log_index: u64,
        sender: Address,
        payload: &[u8],
        timestamp: u64,
    ) -> Log {
        Log {
            address: Address::repeat_byte(0x11),
            topics: vec![MessageStoredFilter::signature(), sender_topic(sender)],
            data: ethers::abi::encode(&[
                Token::Bytes(payload.to_vec()),
                Token::Uint(U256::from(timestamp)),
            ])
            .into(),
            transaction_hash: Some(transaction_hash),
            log_index: Some(U256::from(log_index)),
            removed: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn from_log_extracts_the_event() {
        let sender = Address::from_str("0xeae4d85f7733ad522f601ce7ad4f595704a2d677").unwrap();
        let log = message_stored_log(H256::repeat_byte(0xab), 2, sender, b"Hello", 100);

        let event = RawEvent::from_log(&log).unwrap();
        assert_eq!(event.transaction_hash, H256::repeat_byte(0xab));
        assert_eq!(event.log_index, 2);
        assert_eq!(event.sender, sender);
        assert_eq!(event.payload, "0x48656c6c6f");
        assert_eq!(event.block_timestamp, 100);
    }

    #[test]
    fn from_log_rejects_pending_logs() {
        let sender = Address::repeat_byte(0x22);
        let mut log = message_stored_log(H256::repeat_byte(0xab), 0, sender, b"Hello", 100);
        log.transaction_hash = None;
        assert!(matches!(
            RawEvent::from_log(&log),
            Err(InvalidEvent::PendingLog)
        ));

        let mut log = message_stored_log(H256::repeat_byte(0xab), 0, sender, b"Hello", 100);
        log.removed = Some(true);
        assert!(matches!(
            RawEvent::from_log(&log),
            Err(InvalidEvent::PendingLog)
        ));
    }

    #[test]
    fn map_derives_the_id_and_decodes_the_payload() {
        let event = RawEvent {
            transaction_hash: H256::repeat_byte(0xab),
            log_index: 0,
            sender: Address::repeat_byte(0x51),
            payload: "0x48656c6c6f".to_string(),
            block_timestamp: 100,
        };

        let msg = map(&event, PayloadPolicy::Decode).unwrap();
        assert_eq!(
            msg.id,
            format!("{:#x}-0", H256::repeat_byte(0xab))
        );
        assert_eq!(msg.sender, format!("{:#x}", Address::repeat_byte(0x51)));
        assert_eq!(msg.message, "Hello");
        assert_eq!(msg.timestamp, 100);

        // mapping is deterministic
        assert_eq!(msg, map(&event, PayloadPolicy::Decode).unwrap());
    }

    #[test]
    fn map_passes_the_payload_through_under_the_raw_policy() {
        let event = RawEvent {
            transaction_hash: H256::repeat_byte(0xab),
            log_index: 1,
            sender: Address::repeat_byte(0x52),
            payload: "0x576f726c64".to_string(),
            block_timestamp: 100,
        };

        let msg = map(&event, PayloadPolicy::Raw).unwrap();
        assert_eq!(msg.message, "0x576f726c64");
    }

    #[test]
    fn map_rejects_malformed_payloads_under_the_decode_policy() {
        let event = RawEvent {
            transaction_hash: H256::repeat_byte(0xab),
            log_index: 0,
            sender: Address::repeat_byte(0x51),
            payload: "0x48656".to_string(),
            block_timestamp: 100,
        };

        assert!(matches!(
            map(&event, PayloadPolicy::Decode),
            Err(InvalidEvent::BadPayload(_))
        ));
    }
}
