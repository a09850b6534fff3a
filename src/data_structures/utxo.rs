//! UTXO records and spend tracking

use serde::{Deserialize, Serialize};

use super::keys::TxKey;
use super::types::{Satoshis, Script};

/// One output of a transaction in the local model.
///
/// Amount, script and index are write-once at construction. `spends` is
/// the only mutable field: it records every transaction observed, locally
/// or from the node, to consume this output. Entries are kept in
/// discovery order and are never removed; a spend list may be non-empty
/// while the owning outpoint is still mock (a contract path constructed
/// before broadcast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    owner: TxKey,
    vout: u32,
    amount: Satoshis,
    script: Script,
    spends: Vec<TxKey>,
}

impl UtxoRecord {
    pub(crate) fn new(owner: TxKey, vout: u32, amount: Satoshis, script: Script) -> Self {
        Self {
            owner,
            vout,
            amount,
            script,
            spends: Vec::new(),
        }
    }

    /// Key of the owning transaction. A relation, not ownership: the
    /// transaction record lives in the graph's entity table.
    pub fn owner(&self) -> TxKey {
        self.owner
    }

    pub fn vout(&self) -> u32 {
        self.vout
    }

    pub fn amount(&self) -> Satoshis {
        self.amount
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Spending transactions in discovery order
    pub fn spends(&self) -> &[TxKey] {
        &self.spends
    }

    pub fn is_spent(&self) -> bool {
        !self.spends.is_empty()
    }

    /// Append a spender key. Deduplication by spending txid is enforced by
    /// `ContractGraph::add_spend`, which can resolve keys to ids; this
    /// guard only rejects the exact same key.
    pub(crate) fn push_spend(&mut self, spender: TxKey) -> bool {
        if self.spends.contains(&spender) {
            return false;
        }
        self.spends.push(spender);
        true
    }

    pub(crate) fn contains_spend(&self, spender: TxKey) -> bool {
        self.spends.contains(&spender)
    }
}
