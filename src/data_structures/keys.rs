//! Opaque arena keys for model entities.
//!
//! Transactions and UTXOs are referenced by stable indices into the
//! contract graph's entity tables rather than by raw id strings. Promotion
//! of a phantom transaction rewrites one table entry; every key held
//! elsewhere stays valid and observes the promoted state, so a mock id and
//! its real replacement are never live at the same time.

use serde::{Deserialize, Serialize};

/// Stable key for a transaction record in a contract graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxKey(pub(crate) usize);

impl TxKey {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Stable key for a UTXO record in a contract graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtxoKey(pub(crate) usize);

impl UtxoKey {
    pub fn index(&self) -> usize {
        self.0
    }
}
