use ethers::types::U256;
use lazy_static::lazy_static;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "awaiting lookup",
            TransactionStatus::Success => "confirmed",
            TransactionStatus::Failed => "lookup failed",
        }
    }
}

/// The canonical caller-facing transaction record. Every inspection produces
/// a fresh owned value; views are never shared mutably across requests.
///
/// Money and gas fields are 256-bit integers end to end, so mainnet-scale wei
/// values survive without precision loss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    pub hash: String,
    pub status: TransactionStatus,
    pub status_label: String,
    pub block_number: Option<u64>,
    pub confirmations: u64,
    pub timestamp: i64,
    pub from: String,
    pub to: Option<String>,
    pub value: U256,
    pub gas_price: U256,
    pub gas_used: U256,
    pub gas_limit: U256,
    pub nonce: u64,
    pub transaction_type: u64,
    pub position_in_block: u64,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    /// `0x`-prefixed, even length.
    pub input_data: String,
    /// Empty when the input is empty or does not decode.
    pub decoded_input: String,
}

lazy_static! {
    static ref PLACEHOLDER: TransactionView = TransactionView {
        hash: String::new(),
        status: TransactionStatus::Pending,
        status_label: TransactionStatus::Pending.label().to_string(),
        block_number: None,
        confirmations: 0,
        timestamp: 0,
        from: String::new(),
        to: None,
        value: U256::zero(),
        gas_price: U256::zero(),
        gas_used: U256::zero(),
        gas_limit: U256::zero(),
        nonce: 0,
        transaction_type: 0,
        position_in_block: 0,
        max_fee_per_gas: None,
        max_priority_fee_per_gas: None,
        input_data: "0x".to_string(),
        decoded_input: String::new(),
    };
}

impl TransactionView {
    /// The well-typed empty view published before any lookup resolves.
    /// Constructed once and copied; never mutated in place. The hash is empty
    /// exactly while the status is pending.
    pub fn placeholder() -> Self {
        PLACEHOLDER.clone()
    }
}
