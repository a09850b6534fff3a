//! Contract state tracking libraries for Sapio covenant wallets
//!
//! This crate tracks the local view of Bitcoin smart-contract state:
//! transactions that may or may not yet exist on chain, the outputs they
//! create, which outputs have been spent and by what, and the
//! schema-described spending paths ("continuations") a contract exposes
//! before any of them has been broadcast.
//!
//! Two sources of truth are reconciled continuously: a locally
//! constructed, possibly-unconfirmed contract graph, and an external
//! node's authoritative view of confirmed chain state. The node is
//! consulted by polling - there is no event push - and its answers are
//! overlaid on the local model, never allowed to corrupt it.
//!
//! ## Layout
//!
//! - [`data_structures`]: identifiers, outpoints, transaction and UTXO
//!   records, address rendering
//! - [`contract`]: the arena-backed contract graph, the continuation
//!   registry, and the artifact store boundary
//! - [`oracle`]: the async boundary to the external node
//! - [`reconciliation`]: the polling engine, per-outpoint state machine,
//!   poll loops and cancellation, plus mock collaborators for tests
//! - [`wallet`]: polling watchers for balance, send history, and the
//!   compiled-contract list
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use covenant_tracking_libs::contract::{ContinuationRegistry, ContractGraph};
//! use covenant_tracking_libs::data_structures::Network;
//! use covenant_tracking_libs::reconciliation::{MockOracle, ReconciliationEngine};
//!
//! # async fn run() {
//! let graph = ContractGraph::new().into_shared();
//! let engine = ReconciliationEngine::new(
//!     graph,
//!     Arc::new(MockOracle::new()),
//!     Arc::new(ContinuationRegistry::new()),
//!     Network::Regtest,
//! );
//! # }
//! ```

pub mod contract;
pub mod data_structures;
pub mod errors;
pub mod oracle;
pub mod reconciliation;
pub mod wallet;

pub use contract::*;
pub use errors::*;
pub use oracle::*;
pub use reconciliation::*;
pub use wallet::*;
