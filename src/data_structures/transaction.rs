//! Transaction records: locally-authored phantoms and confirmed concretes

use std::fmt::{Display, Formatter};

use blake2::{Blake2b, Digest};
use digest::consts::U32;
use serde::{Deserialize, Serialize};

use super::types::{hex_bytes, Satoshis, Script, TxId};

/// One output a transaction will create once signed and broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTemplate {
    pub amount: Satoshis,
    pub script: Script,
}

impl OutputTemplate {
    pub fn new(amount: impl Into<Satoshis>, script: Script) -> Self {
        Self {
            amount: amount.into(),
            script,
        }
    }
}

/// Raw transaction bytes plus the outputs they create.
///
/// This is the shape the contract compiler hands over: enough to render
/// and link outputs before the transaction exists on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTemplate {
    #[serde(with = "hex_bytes")]
    pub raw: Vec<u8>,
    pub outputs: Vec<OutputTemplate>,
}

impl TxTemplate {
    pub fn new(raw: Vec<u8>, outputs: Vec<OutputTemplate>) -> Self {
        Self { raw, outputs }
    }

    /// Blake2b-256 digest of the raw transaction bytes
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(&self.raw);
        Fingerprint(hasher.finalize().into())
    }
}

/// Content fingerprint of a transaction template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A transaction as known to the local model.
///
/// Tagged union rather than a class hierarchy: both variants expose the
/// same accessors and exhaustive handling is checked at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionRecord {
    /// Authored locally, not yet observed on chain; the id is a
    /// synthesized placeholder
    Phantom { txid: TxId, template: TxTemplate },
    /// Known to the node under a real, content-derived id
    Concrete { txid: TxId, template: TxTemplate },
}

impl TransactionRecord {
    pub fn phantom(txid: TxId, template: TxTemplate) -> Self {
        Self::Phantom { txid, template }
    }

    pub fn concrete(txid: TxId, template: TxTemplate) -> Self {
        Self::Concrete { txid, template }
    }

    /// The stored id: synthesized for phantoms, real for concretes.
    ///
    /// Always a field read; never derived from serialization on access.
    pub fn txid(&self) -> &TxId {
        match self {
            Self::Phantom { txid, .. } | Self::Concrete { txid, .. } => txid,
        }
    }

    pub fn template(&self) -> &TxTemplate {
        match self {
            Self::Phantom { template, .. } | Self::Concrete { template, .. } => template,
        }
    }

    pub fn outputs(&self) -> &[OutputTemplate] {
        &self.template().outputs
    }

    pub fn is_phantom(&self) -> bool {
        matches!(self, Self::Phantom { .. })
    }

    /// Deduplication key for UI transaction lists.
    ///
    /// Two independently reconstructed phantoms for the same intended
    /// transaction get distinct synthesized ids but identical raw bytes,
    /// so the content fingerprint collapses them.
    pub fn dedup_key(&self) -> (TxId, Fingerprint) {
        (self.txid().clone(), self.template().fingerprint())
    }
}
