//! External node oracle boundary.
//!
//! The oracle is the authoritative source for confirmed chain state. It is
//! consulted on demand and its answers are overlaid on the local model,
//! never persisted as a source of truth: the local model stays
//! authoritative for anything the oracle cannot answer, mock outpoints
//! included.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data_structures::{OutPoint, Satoshis, TxId};
use crate::errors::TrackerResult;

/// Script detail reported by the node for an output
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExternalScriptPubKey {
    #[serde(default)]
    pub address: Option<String>,
}

/// The oracle's answer for a real outpoint.
///
/// Ephemeral: fetched on each poll tick (confirmation counts change over
/// time) and used as an overlay. Locally-known script and amount remain
/// the fallback when the view is absent a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalUtxoView {
    pub confirmations: i64,
    pub script_pub_key: ExternalScriptPubKey,
    pub amount: Satoshis,
}

impl ExternalUtxoView {
    pub fn is_confirmed(&self) -> bool {
        self.confirmations > 0
    }
}

/// Transaction category in the node's wallet listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxCategory {
    Send,
    Receive,
    Generate,
    Immature,
    Orphan,
}

/// One entry of the node's wallet transaction listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInfo {
    pub txid: TxId,
    #[serde(default)]
    pub address: Option<String>,
    pub category: TxCategory,
    /// Amount in BTC as reported by the node; negative for sends
    pub amount: f64,
    #[serde(default)]
    pub fee: Option<f64>,
    /// Negative when the transaction conflicted that many blocks ago
    pub confirmations: i64,
    #[serde(default)]
    pub blockhash: Option<String>,
    #[serde(default)]
    pub blockheight: Option<u64>,
    #[serde(default)]
    pub blocktime: Option<u64>,
    pub time: u64,
}

/// Async boundary to the external node.
///
/// `get_utxo` answers `Ok(None)` when the node has no record of the
/// outpoint - already spent past the node's retained window, or not yet
/// propagated. That is a valid negative result, distinct from `Err`
/// (node unreachable), and callers must not treat it as a failure or
/// clear local state because of it.
#[async_trait]
pub trait NodeOracle: Send + Sync {
    async fn get_utxo(&self, outpoint: &OutPoint) -> TrackerResult<Option<ExternalUtxoView>>;

    /// Most recent wallet transactions, newest first, up to `limit`
    async fn list_transactions(&self, limit: usize) -> TrackerResult<Vec<TxInfo>>;

    async fn get_new_address(&self) -> TrackerResult<String>;

    async fn check_balance(&self) -> TrackerResult<Satoshis>;

    /// Broadcast a plain wallet spend. User-initiated; errors propagate to
    /// the invoking action as a result value.
    async fn send_to_address(&self, amount: Satoshis, address: &str) -> TrackerResult<TxId>;
}
