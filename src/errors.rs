//! Error types for covenant state tracking
//!
//! Failures are grouped by the collaborator they originate from. The
//! reconciliation engine absorbs oracle failures and retries on the next
//! poll tick; only user-initiated actions (send, trash) surface a
//! `TrackerError` to the caller.

use thiserror::Error;

/// Result type alias for tracking operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Top-level error type for the tracking library
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Errors reaching the external node.
///
/// A missing outpoint is NOT an oracle error: `NodeOracle::get_utxo`
/// answers `Ok(None)` for unknown outpoints so that retry cadence and UI
/// messaging can differ between "node said no" and "node unreachable".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The node could not be reached or the request failed in transit
    #[error("node unavailable: {0}")]
    Unavailable(String),

    /// The node answered with something that could not be interpreted
    #[error("invalid node response: {0}")]
    InvalidResponse(String),
}

/// Errors decoding an output script to an address
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The script is empty or shorter than any known address form
    #[error("script is truncated")]
    Truncated,

    /// The script does not match any address form this library renders
    #[error("script does not encode a known address form")]
    UnknownForm,
}

/// Errors in the local entity model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A promotion would bind a real id that is already held by a different
    /// record, or re-promote a record that is already concrete. The mock
    /// entry is kept rather than silently dropping history.
    #[error("identity conflict promoting {mock} to {real}")]
    IdentityConflict { mock: String, real: String },

    #[error("unknown transaction key {0}")]
    UnknownTxKey(usize),

    #[error("unknown utxo key {0}")]
    UnknownUtxoKey(usize),

    #[error("output index {vout} out of range for transaction {txid}")]
    OutputOutOfRange { txid: String, vout: u32 },

    #[error("malformed outpoint key: {0}")]
    MalformedOutpointKey(String),
}

/// Errors from the compiled-contract artifact store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("malformed artifact id: {0}")]
    MalformedId(String),

    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("artifact store failure: {0}")]
    Store(String),
}
