//! Reconciliation of local contract state against the external node

pub mod cancellation;
pub mod engine;
pub mod mocks;
pub mod poller;
pub mod status;

pub use cancellation::{CancellationHandle, CancellationToken};
pub use engine::{spawn_outpoint_watcher, OutpointSnapshot, PollOutcome, ReconciliationEngine};
pub use mocks::{MockArtifactStore, MockFailureModes, MockOracle};
pub use poller::{spawn_poll_loop, PollHandle};
pub use status::OutpointStatus;
