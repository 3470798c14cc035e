use entity::indexed_messages::{ActiveModel, Model};
use ethers::types::H256;
use sea_orm::Set;
use serde::Serialize;

/// The durable entity derived from a [`RawEvent`](super::RawEvent).
/// Write-once: the id is a pure function of `(transaction_hash, log_index)`,
/// so replayed upstream events land on the same key and never create a
/// duplicate or mutate an existing row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexedMessage {
    pub id: String,
    pub sender: String,
    pub message: String,
    pub timestamp: i64,
}

impl IndexedMessage {
    pub fn derive_id(transaction_hash: H256, log_index: u64) -> String {
        format!("{transaction_hash:#x}-{log_index}")
    }

    /// The transaction-hash part of the id.
    pub fn transaction_hash(&self) -> &str {
        self.id
            .rsplit_once('-')
            .map(|(hash, _)| hash)
            .unwrap_or(&self.id)
    }

    /// The log-index part of the id.
    pub fn log_index(&self) -> u64 {
        self.id
            .rsplit_once('-')
            .and_then(|(_, index)| index.parse().ok())
            .unwrap_or(0)
    }
}

impl From<Model> for IndexedMessage {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            sender: model.sender,
            message: model.message,
            timestamp: model.timestamp,
        }
    }
}

impl From<IndexedMessage> for ActiveModel {
    fn from(msg: IndexedMessage) -> Self {
        Self {
            id: Set(msg.id),
            sender: Set(msg.sender),
            message: Set(msg.message),
            timestamp: Set(msg.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn id_is_a_pure_function_of_hash_and_log_index() {
        let hash = H256::from_str(
            "0x2d5f7a884e9a99cfe2445db2af140a8851fbd860852b668f2f199190f68adf87",
        )
        .unwrap();
        let id = IndexedMessage::derive_id(hash, 7);
        assert_eq!(
            id,
            "0x2d5f7a884e9a99cfe2445db2af140a8851fbd860852b668f2f199190f68adf87-7"
        );
        assert_eq!(id, IndexedMessage::derive_id(hash, 7));
    }

    #[test]
    fn id_parts_round_trip() {
        let msg = IndexedMessage {
            id: IndexedMessage::derive_id(H256::repeat_byte(0xab), 3),
            sender: "0xS1".to_string(),
            message: "Hello".to_string(),
            timestamp: 100,
        };
        assert_eq!(msg.transaction_hash(), format!("{:#x}", H256::repeat_byte(0xab)));
        assert_eq!(msg.log_index(), 3);
    }
}
