//! Contract-level state: the entity graph, continuation registry, and
//! artifact store boundary

pub mod artifacts;
pub mod continuations;
pub mod graph;

pub use artifacts::{ArtifactId, ArtifactStore};
pub use continuations::{Continuation, ContinuationRegistry};
pub use graph::{ContractGraph, RekeyedOutpoint, SharedContractGraph};
