//! Arena-backed contract graph.
//!
//! The graph is the shared entity table for everything the tracking layer
//! knows about a loaded contract: transaction records, the UTXOs they
//! create, and which transactions spend which outputs. Entities are
//! addressed by stable opaque keys (`TxKey`, `UtxoKey`); the txid index is
//! rebuilt atomically when a phantom is promoted, so the synthesized
//! outpoint and its real replacement are never both resolvable.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::data_structures::{
    OutPoint, TransactionRecord, TxId, TxKey, TxTemplate, UtxoKey, UtxoRecord,
};
use crate::errors::ModelError;

/// Contract graph shared between the reconciliation engine and readers
pub type SharedContractGraph = Arc<RwLock<ContractGraph>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TxEntry {
    record: TransactionRecord,
    outputs: Vec<UtxoKey>,
}

/// Outpoint rename produced by a promotion: the mock outpoint stops
/// resolving and the real one takes its place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RekeyedOutpoint {
    pub old: OutPoint,
    pub new: OutPoint,
}

/// Local view of a contract's transactions and outputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractGraph {
    txns: Vec<TxEntry>,
    utxos: Vec<UtxoRecord>,
    by_txid: HashMap<TxId, TxKey>,
    next_mock_seq: u64,
}

impl ContractGraph {
    pub fn new() -> Self {
        Self {
            txns: Vec::new(),
            utxos: Vec::new(),
            by_txid: HashMap::new(),
            next_mock_seq: 0,
        }
    }

    pub fn into_shared(self) -> SharedContractGraph {
        Arc::new(RwLock::new(self))
    }

    /// Insert a locally-authored transaction, allocating a synthesized id
    /// and one UTXO record per template output
    pub fn insert_phantom(&mut self, template: TxTemplate) -> TxKey {
        self.next_mock_seq += 1;
        let txid = TxId::synthesized(self.next_mock_seq);
        self.insert_record(TransactionRecord::phantom(txid, template))
    }

    /// Insert a transaction already known by its real id.
    ///
    /// Idempotent by txid: re-inserting an id returns the existing key and
    /// leaves the stored record untouched.
    pub fn insert_concrete(&mut self, txid: TxId, template: TxTemplate) -> TxKey {
        if let Some(&key) = self.by_txid.get(&txid) {
            return key;
        }
        self.insert_record(TransactionRecord::concrete(txid, template))
    }

    fn insert_record(&mut self, record: TransactionRecord) -> TxKey {
        let key = TxKey(self.txns.len());
        let mut outputs = Vec::with_capacity(record.outputs().len());
        for (vout, output) in record.outputs().iter().enumerate() {
            let utxo_key = UtxoKey(self.utxos.len());
            self.utxos.push(UtxoRecord::new(
                key,
                vout as u32,
                output.amount,
                output.script.clone(),
            ));
            outputs.push(utxo_key);
        }
        self.by_txid.insert(record.txid().clone(), key);
        self.txns.push(TxEntry { record, outputs });
        key
    }

    pub fn tx(&self, key: TxKey) -> Option<&TransactionRecord> {
        self.txns.get(key.0).map(|entry| &entry.record)
    }

    pub fn utxo(&self, key: UtxoKey) -> Option<&UtxoRecord> {
        self.utxos.get(key.0)
    }

    /// UTXO keys created by a transaction, in output order
    pub fn outputs_of(&self, key: TxKey) -> &[UtxoKey] {
        self.txns
            .get(key.0)
            .map(|entry| entry.outputs.as_slice())
            .unwrap_or(&[])
    }

    pub fn key_of_txid(&self, txid: &TxId) -> Option<TxKey> {
        self.by_txid.get(txid).copied()
    }

    /// Outpoint naming a UTXO under the owner's CURRENT id
    pub fn outpoint_of(&self, key: UtxoKey) -> Option<OutPoint> {
        let utxo = self.utxos.get(key.0)?;
        let owner = self.tx(utxo.owner())?;
        Some(OutPoint::new(owner.txid().clone(), utxo.vout()))
    }

    /// Resolve an outpoint to its UTXO record, if the transaction is known
    /// under that id
    pub fn utxo_at(&self, outpoint: &OutPoint) -> Option<UtxoKey> {
        let key = self.key_of_txid(&outpoint.txid)?;
        self.txns[key.0]
            .outputs
            .get(outpoint.vout as usize)
            .copied()
    }

    /// True iff the outpoint's transaction is a phantom record in this
    /// graph. False for unknown ids and immediately after promotion.
    pub fn is_mock(&self, outpoint: &OutPoint) -> bool {
        self.key_of_txid(&outpoint.txid)
            .and_then(|key| self.tx(key))
            .map(|record| record.is_phantom())
            .unwrap_or(false)
    }

    /// Promote a phantom to a concrete record in place.
    ///
    /// The entity keys stay valid; only the txid index is rewritten, in one
    /// step, so no reader can observe both ids resolving. Returns the
    /// outpoint renames so tracking state keyed by outpoint can follow.
    ///
    /// Promoting a concrete record, or promoting to an id already bound to
    /// a different record, is an identity conflict: the mock entry is kept
    /// and an error is returned rather than history being dropped.
    pub fn promote(
        &mut self,
        key: TxKey,
        real_id: TxId,
        raw: Vec<u8>,
    ) -> Result<Vec<RekeyedOutpoint>, ModelError> {
        let entry = self
            .txns
            .get(key.0)
            .ok_or(ModelError::UnknownTxKey(key.0))?;
        let old_id = entry.record.txid().clone();

        if !entry.record.is_phantom() {
            return Err(ModelError::IdentityConflict {
                mock: old_id.to_string(),
                real: real_id.to_string(),
            });
        }
        if let Some(&bound) = self.by_txid.get(&real_id) {
            if bound != key {
                return Err(ModelError::IdentityConflict {
                    mock: old_id.to_string(),
                    real: real_id.to_string(),
                });
            }
        }

        let outputs = entry.record.outputs().to_vec();
        let rekeys = (0..outputs.len() as u32)
            .map(|vout| RekeyedOutpoint {
                old: OutPoint::new(old_id.clone(), vout),
                new: OutPoint::new(real_id.clone(), vout),
            })
            .collect();

        self.txns[key.0].record =
            TransactionRecord::concrete(real_id.clone(), TxTemplate::new(raw, outputs));
        self.by_txid.remove(&old_id);
        self.by_txid.insert(real_id, key);
        Ok(rekeys)
    }

    /// Record `spender` as consuming `utxo`.
    ///
    /// Idempotent by the spender's txid: a second call with a transaction
    /// sharing the id is a no-op. Returns whether an entry was appended.
    pub fn add_spend(&mut self, utxo: UtxoKey, spender: TxKey) -> Result<bool, ModelError> {
        let spender_txid = self
            .tx(spender)
            .ok_or(ModelError::UnknownTxKey(spender.0))?
            .txid()
            .clone();
        let record = self
            .utxos
            .get(utxo.0)
            .ok_or(ModelError::UnknownUtxoKey(utxo.0))?;
        if record.contains_spend(spender) {
            return Ok(false);
        }
        let duplicate_id = record
            .spends()
            .iter()
            .any(|&key| self.txns[key.0].record.txid() == &spender_txid);
        if duplicate_id {
            return Ok(false);
        }
        Ok(self.utxos[utxo.0].push_spend(spender))
    }

    /// Spending txids of a UTXO, in discovery order
    pub fn spend_txids(&self, utxo: UtxoKey) -> Vec<TxId> {
        self.utxo(utxo)
            .map(|record| {
                record
                    .spends()
                    .iter()
                    .filter_map(|&key| self.tx(key).map(|tx| tx.txid().clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All transactions with their keys, in insertion order
    pub fn transactions(&self) -> impl Iterator<Item = (TxKey, &TransactionRecord)> {
        self.txns
            .iter()
            .enumerate()
            .map(|(i, entry)| (TxKey(i), &entry.record))
    }

    pub fn transaction_count(&self) -> usize {
        self.txns.len()
    }

    pub fn utxo_count(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }
}
