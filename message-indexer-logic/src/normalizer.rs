//! Normalization of heterogeneous transaction shapes into the canonical
//! [`TransactionView`]. Sources are a tagged union so every shape is handled
//! by exhaustive matching instead of field probing.

use crate::{
    codec,
    types::{IndexedMessage, TransactionStatus, TransactionView},
};
use ethers::types::{Transaction, TransactionReceipt};

/// One inspectable transaction, in whichever shape the lookup produced it.
#[derive(Clone, Debug)]
pub enum TransactionSource {
    /// An entity from the message index.
    Indexed(IndexedMessage),
    /// A provider-native record from a live node lookup.
    Provider {
        transaction: Transaction,
        receipt: Option<TransactionReceipt>,
        latest_block: Option<u64>,
        block_timestamp: Option<i64>,
    },
}

/// Pure mapping into the canonical view. The embedded input decode degrades
/// on malformed hex: the error is logged, `decoded_input` stays empty, and
/// every other field is still populated — a bad payload never blocks showing
/// the rest of the transaction.
pub fn normalize(source: TransactionSource) -> TransactionView {
    match source {
        TransactionSource::Indexed(msg) => normalize_indexed(msg),
        TransactionSource::Provider {
            transaction,
            receipt,
            latest_block,
            block_timestamp,
        } => normalize_provider(transaction, receipt, latest_block, block_timestamp),
    }
}

fn normalize_indexed(msg: IndexedMessage) -> TransactionView {
    let status = TransactionStatus::Success;
    let input_data = if msg.message.starts_with("0x") {
        msg.message.clone()
    } else {
        match codec::encode(&msg.message) {
            Ok(encoded) => format!("0x{encoded}"),
            Err(err) => {
                tracing::warn!(id = %msg.id, error = %err, "stored message is not hex-representable");
                "0x".to_string()
            }
        }
    };

    TransactionView {
        hash: msg.transaction_hash().to_string(),
        status,
        status_label: status.label().to_string(),
        timestamp: msg.timestamp,
        from: msg.sender.clone(),
        // message store writes carry no explicit recipient
        to: None,
        position_in_block: msg.log_index(),
        decoded_input: decode_display_input(&input_data),
        input_data,
        ..TransactionView::placeholder()
    }
}

fn normalize_provider(
    transaction: Transaction,
    receipt: Option<TransactionReceipt>,
    latest_block: Option<u64>,
    block_timestamp: Option<i64>,
) -> TransactionView {
    let status = match &receipt {
        None => TransactionStatus::Pending,
        Some(receipt) => match receipt.status {
            Some(status) if status.is_zero() => TransactionStatus::Failed,
            _ => TransactionStatus::Success,
        },
    };
    let block_number = transaction.block_number.map(|number| number.as_u64());
    let confirmations = match (latest_block, block_number) {
        (Some(latest), Some(mined)) => latest.saturating_sub(mined) + 1,
        _ => 0,
    };
    let input_data = format!("0x{}", hex::encode(&transaction.input));

    TransactionView {
        hash: format!("{:#x}", transaction.hash),
        status,
        status_label: status.label().to_string(),
        block_number,
        confirmations,
        timestamp: block_timestamp.unwrap_or(0),
        from: format!("{:#x}", transaction.from),
        to: transaction.to.map(|to| format!("{to:#x}")),
        value: transaction.value,
        gas_price: transaction.gas_price.unwrap_or_default(),
        gas_used: receipt.and_then(|r| r.gas_used).unwrap_or_default(),
        gas_limit: transaction.gas,
        nonce: transaction.nonce.low_u64(),
        transaction_type: transaction
            .transaction_type
            .map(|tx_type| tx_type.as_u64())
            .unwrap_or(0),
        position_in_block: transaction
            .transaction_index
            .map(|index| index.as_u64())
            .unwrap_or(0),
        max_fee_per_gas: transaction.max_fee_per_gas,
        max_priority_fee_per_gas: transaction.max_priority_fee_per_gas,
        decoded_input: decode_display_input(&input_data),
        input_data,
        ..TransactionView::placeholder()
    }
}

fn decode_display_input(input_data: &str) -> String {
    match codec::decode(input_data) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "failed to decode call input, display text left empty");
            String::new()
        }
    }
}
