//! Core data structures for the covenant tracking model

pub mod address;
pub mod keys;
pub mod outpoint;
pub mod transaction;
pub mod types;
pub mod utxo;

pub use address::{address_from_script, display_address, Network, UNKNOWN_ADDRESS};
pub use keys::{TxKey, UtxoKey};
pub use outpoint::{parse_outpoint_key, OutPoint};
pub use transaction::{Fingerprint, OutputTemplate, TransactionRecord, TxTemplate};
pub use types::{Satoshis, Script, TxId, MOCK_ID_PREFIX};
pub use utxo::UtxoRecord;
