pub mod event;
pub mod message;
pub mod transaction;

pub use event::{InvalidEvent, RawEvent};
pub use message::IndexedMessage;
pub use transaction::{TransactionStatus, TransactionView};
