//! Per-outpoint reconciliation states

use serde::{Deserialize, Serialize};

use crate::oracle::ExternalUtxoView;

/// State of one tracked outpoint.
///
/// The engine is level-triggered: from any resolved or errored state the
/// next poll tick re-enters `Fetching`, because confirmation counts change
/// over time and a cached answer goes stale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum OutpointStatus {
    /// No fetch attempted yet
    #[default]
    Unknown,
    /// The outpoint is mock: the node cannot resolve a synthesized id, so
    /// no fetch is issued. A sink until promotion supplies a real id and
    /// rekeys the tracked entry.
    MockPending,
    /// A request to the oracle is in flight
    Fetching,
    /// The oracle returned a view of the outpoint
    ResolvedFound(ExternalUtxoView),
    /// The oracle has no record of the outpoint. A valid result, not an
    /// error: it must not clear any locally-held spend history.
    ResolvedNotFound,
    /// The fetch itself failed. Last-known state is retained and the
    /// fetch retries on the next tick; UI falls back to treating the
    /// outpoint as unconfirmed.
    Errored,
}

impl OutpointStatus {
    pub fn view(&self) -> Option<&ExternalUtxoView> {
        match self {
            OutpointStatus::ResolvedFound(view) => Some(view),
            _ => None,
        }
    }

    /// Confirmed on chain per the most recent oracle answer
    pub fn is_confirmed(&self) -> bool {
        self.view().map(|v| v.is_confirmed()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::Satoshis;
    use crate::oracle::ExternalScriptPubKey;

    fn view(confirmations: i64) -> ExternalUtxoView {
        ExternalUtxoView {
            confirmations,
            script_pub_key: ExternalScriptPubKey::default(),
            amount: Satoshis::new(5000),
        }
    }

    #[test]
    fn test_only_found_views_confirm() {
        assert!(!OutpointStatus::Unknown.is_confirmed());
        assert!(!OutpointStatus::MockPending.is_confirmed());
        assert!(!OutpointStatus::ResolvedNotFound.is_confirmed());
        assert!(!OutpointStatus::Errored.is_confirmed());
        assert!(!OutpointStatus::ResolvedFound(view(0)).is_confirmed());
        assert!(OutpointStatus::ResolvedFound(view(1)).is_confirmed());
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(OutpointStatus::default(), OutpointStatus::Unknown);
    }
}
