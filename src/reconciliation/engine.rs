//! Reconciliation engine: merges oracle truth into the local model.
//!
//! The engine keeps a table of tracked outpoints, each with its own state
//! machine, and reconciles them against the external node on a polling
//! cadence. The oracle's answers are overlaid on the local model; the
//! local model remains authoritative for anything the oracle cannot
//! answer - mock outpoints by definition, and any field a view is absent.
//!
//! At most one fetch is in flight per outpoint: an overlapping poll tick
//! skips instead of issuing a second request, so a stale response can
//! never overwrite a fresher one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::contract::{ContinuationRegistry, RekeyedOutpoint, SharedContractGraph};
use crate::data_structures::{display_address, Network, OutPoint, Satoshis, TxId, TxKey};
use crate::errors::TrackerResult;
use crate::oracle::{ExternalUtxoView, NodeOracle};

use super::cancellation::CancellationToken;
use super::poller::{spawn_poll_loop, PollHandle};
use super::status::OutpointStatus;

#[derive(Debug, Clone, Default)]
struct TrackedOutpoint {
    status: OutpointStatus,
    /// Most recent successful view, retained across NotFound and Errored
    /// ticks as the UI's last-known-good fallback.
    last_view: Option<ExternalUtxoView>,
    in_flight: bool,
}

/// Outcome of one poll attempt for an outpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The outpoint is mock; no fetch was issued
    MockPending,
    /// A fetch for this outpoint was already outstanding
    Skipped,
    /// The oracle returned a view
    Found,
    /// The oracle has no record of the outpoint
    NotFound,
    /// The fetch failed; state retained, retry on the next tick
    Failed,
    /// Cancellation was requested while the fetch was in flight; the
    /// result was discarded unapplied
    Cancelled,
}

/// UI-facing view of one tracked outpoint: local values with the oracle
/// view overlaid where present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutpointSnapshot {
    pub outpoint: OutPoint,
    pub is_mock: bool,
    pub status: OutpointStatus,
    pub confirmations: Option<i64>,
    pub amount: Satoshis,
    pub address: String,
    pub spends: Vec<TxId>,
    /// Continuation paths registered for this outpoint, sorted
    pub continuations: Vec<String>,
}

/// Merges external-node truth into the shared contract graph
pub struct ReconciliationEngine {
    graph: SharedContractGraph,
    oracle: Arc<dyn NodeOracle>,
    registry: Arc<ContinuationRegistry>,
    network: Network,
    tracked: Mutex<HashMap<OutPoint, TrackedOutpoint>>,
}

impl ReconciliationEngine {
    pub fn new(
        graph: SharedContractGraph,
        oracle: Arc<dyn NodeOracle>,
        registry: Arc<ContinuationRegistry>,
        network: Network,
    ) -> Self {
        Self {
            graph,
            oracle,
            registry,
            network,
            tracked: Mutex::new(HashMap::new()),
        }
    }

    pub fn graph(&self) -> &SharedContractGraph {
        &self.graph
    }

    pub fn registry(&self) -> &Arc<ContinuationRegistry> {
        &self.registry
    }

    /// Begin tracking an outpoint. Mock outpoints park in `MockPending`
    /// until promotion rekeys them.
    pub async fn track(&self, outpoint: OutPoint) {
        let is_mock = self.graph.read().await.is_mock(&outpoint);
        let mut tracked = self.tracked.lock().await;
        let entry = tracked.entry(outpoint).or_default();
        if is_mock {
            entry.status = OutpointStatus::MockPending;
        }
    }

    pub async fn tracked_outpoints(&self) -> Vec<OutPoint> {
        self.tracked.lock().await.keys().cloned().collect()
    }

    pub async fn status_of(&self, outpoint: &OutPoint) -> Option<OutpointStatus> {
        self.tracked
            .lock()
            .await
            .get(outpoint)
            .map(|entry| entry.status.clone())
    }

    /// Last successful oracle view for an outpoint, if any tick ever found
    /// one
    pub async fn last_view(&self, outpoint: &OutPoint) -> Option<ExternalUtxoView> {
        self.tracked
            .lock()
            .await
            .get(outpoint)
            .and_then(|entry| entry.last_view.clone())
    }

    /// One level-triggered reconciliation pass for a single outpoint.
    ///
    /// Tracks the outpoint if it was not tracked yet. Skips when a fetch
    /// is already outstanding, and discards the response unapplied when
    /// `token` was cancelled while the fetch was in flight.
    pub async fn poll_outpoint(
        &self,
        outpoint: &OutPoint,
        token: &CancellationToken,
    ) -> PollOutcome {
        let is_mock = self.graph.read().await.is_mock(outpoint);
        {
            let mut tracked = self.tracked.lock().await;
            let entry = tracked.entry(outpoint.clone()).or_default();
            if is_mock {
                // The node cannot resolve a synthesized id; wait for the
                // submission flow to promote the owning transaction.
                entry.status = OutpointStatus::MockPending;
                return PollOutcome::MockPending;
            }
            if entry.in_flight {
                debug!(outpoint = %outpoint, "fetch already outstanding, skipping tick");
                return PollOutcome::Skipped;
            }
            entry.in_flight = true;
            entry.status = OutpointStatus::Fetching;
        }

        let result = self.oracle.get_utxo(outpoint).await;

        let mut tracked = self.tracked.lock().await;
        let entry = tracked.entry(outpoint.clone()).or_default();
        entry.in_flight = false;
        if token.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        match result {
            Ok(Some(view)) => {
                entry.last_view = Some(view.clone());
                entry.status = OutpointStatus::ResolvedFound(view);
                PollOutcome::Found
            }
            Ok(None) => {
                // Valid negative answer: already spent past the node's
                // retained window, or not yet propagated. Local spend
                // history stays untouched.
                entry.status = OutpointStatus::ResolvedNotFound;
                PollOutcome::NotFound
            }
            Err(err) => {
                warn!(
                    outpoint = %outpoint,
                    error = %err,
                    "oracle fetch failed, retaining last known state"
                );
                entry.status = OutpointStatus::Errored;
                PollOutcome::Failed
            }
        }
    }

    /// Promote a phantom transaction once the surrounding submission flow
    /// has observed its confirmed id.
    ///
    /// Rekeys tracked state from the mock outpoints to the real ones; the
    /// real outpoints restart in `Unknown` and are fetched on their next
    /// tick. An identity conflict is logged, the mock entry is kept, and
    /// the error is returned.
    pub async fn handle_promotion(
        &self,
        key: TxKey,
        real_id: TxId,
        raw: Vec<u8>,
    ) -> TrackerResult<Vec<RekeyedOutpoint>> {
        let rekeys = {
            let mut graph = self.graph.write().await;
            match graph.promote(key, real_id, raw) {
                Ok(rekeys) => rekeys,
                Err(err) => {
                    warn!(error = %err, "promotion rejected, keeping mock entry");
                    return Err(err.into());
                }
            }
        };
        let mut tracked = self.tracked.lock().await;
        for rekey in &rekeys {
            if tracked.remove(&rekey.old).is_some() {
                tracked.insert(rekey.new.clone(), TrackedOutpoint::default());
            }
        }
        Ok(rekeys)
    }

    /// Compose the UI-facing view of an outpoint
    pub async fn snapshot(&self, outpoint: &OutPoint) -> OutpointSnapshot {
        let (is_mock, local_amount, local_script, spends) = {
            let graph = self.graph.read().await;
            let utxo = graph.utxo_at(outpoint).and_then(|key| {
                graph
                    .utxo(key)
                    .map(|record| (key, record.amount(), record.script().clone()))
            });
            match utxo {
                Some((key, amount, script)) => (
                    graph.is_mock(outpoint),
                    Some(amount),
                    Some(script),
                    graph.spend_txids(key),
                ),
                None => (graph.is_mock(outpoint), None, None, Vec::new()),
            }
        };
        let (status, view) = {
            let tracked = self.tracked.lock().await;
            tracked
                .get(outpoint)
                .map(|entry| (entry.status.clone(), entry.last_view.clone()))
                .unwrap_or_default()
        };

        let amount = view
            .as_ref()
            .map(|v| v.amount)
            .or(local_amount)
            .unwrap_or(Satoshis::ZERO);
        let external_address = view
            .as_ref()
            .and_then(|v| v.script_pub_key.address.as_deref());
        let local_script = local_script.unwrap_or_default();
        let address = display_address(external_address, &local_script, self.network);

        OutpointSnapshot {
            outpoint: outpoint.clone(),
            is_mock,
            status,
            confirmations: view.as_ref().map(|v| v.confirmations),
            amount,
            address,
            spends,
            continuations: self.registry.paths(&outpoint.key()),
        }
    }
}

/// Spawn the polling loop for one tracked outpoint
pub fn spawn_outpoint_watcher(
    engine: Arc<ReconciliationEngine>,
    outpoint: OutPoint,
    interval: Duration,
) -> PollHandle {
    spawn_poll_loop(interval, move |token| {
        let engine = engine.clone();
        let outpoint = outpoint.clone();
        async move {
            engine.poll_outpoint(&outpoint, &token).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractGraph;
    use crate::data_structures::{OutputTemplate, Script, TxTemplate};
    use crate::oracle::ExternalScriptPubKey;
    use crate::reconciliation::mocks::MockOracle;

    fn engine_with(graph: ContractGraph, oracle: MockOracle) -> Arc<ReconciliationEngine> {
        Arc::new(ReconciliationEngine::new(
            graph.into_shared(),
            Arc::new(oracle),
            Arc::new(ContinuationRegistry::new()),
            Network::Regtest,
        ))
    }

    fn funding_template() -> TxTemplate {
        TxTemplate::new(
            vec![0x02, 0x00],
            vec![OutputTemplate::new(5000u64, Script::new(vec![0x51]))],
        )
    }

    fn view(confirmations: i64) -> ExternalUtxoView {
        ExternalUtxoView {
            confirmations,
            script_pub_key: ExternalScriptPubKey::default(),
            amount: Satoshis::new(5000),
        }
    }

    #[tokio::test]
    async fn test_mock_outpoints_do_not_fetch() {
        let mut graph = ContractGraph::new();
        let key = graph.insert_phantom(funding_template());
        let outpoint = {
            let utxo = graph.outputs_of(key)[0];
            graph.outpoint_of(utxo).unwrap()
        };
        let oracle = MockOracle::new();
        let engine = engine_with(graph, oracle.clone());

        let outcome = engine
            .poll_outpoint(&outpoint, &CancellationToken::never())
            .await;
        assert_eq!(outcome, PollOutcome::MockPending);
        assert_eq!(
            engine.status_of(&outpoint).await,
            Some(OutpointStatus::MockPending)
        );
        assert_eq!(oracle.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_found_overlays_and_not_found_retains() {
        let outpoint = OutPoint::new("abc123", 0);
        let oracle = MockOracle::new();
        oracle.insert_utxo(&outpoint, view(2));
        let engine = engine_with(ContractGraph::new(), oracle.clone());

        let outcome = engine
            .poll_outpoint(&outpoint, &CancellationToken::never())
            .await;
        assert_eq!(outcome, PollOutcome::Found);
        assert!(engine.status_of(&outpoint).await.unwrap().is_confirmed());

        // The node forgets the outpoint; last-known view survives.
        oracle.remove_utxo(&outpoint);
        let outcome = engine
            .poll_outpoint(&outpoint, &CancellationToken::never())
            .await;
        assert_eq!(outcome, PollOutcome::NotFound);
        assert_eq!(
            engine.status_of(&outpoint).await,
            Some(OutpointStatus::ResolvedNotFound)
        );
        assert_eq!(engine.last_view(&outpoint).await, Some(view(2)));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_absorbed_and_retried() {
        let outpoint = OutPoint::new("abc123", 0);
        let oracle = MockOracle::new();
        oracle.fail_get_utxo(true);
        let engine = engine_with(ContractGraph::new(), oracle.clone());

        let outcome = engine
            .poll_outpoint(&outpoint, &CancellationToken::never())
            .await;
        assert_eq!(outcome, PollOutcome::Failed);
        assert_eq!(
            engine.status_of(&outpoint).await,
            Some(OutpointStatus::Errored)
        );

        // Next tick re-fetches and recovers.
        oracle.fail_get_utxo(false);
        oracle.insert_utxo(&outpoint, view(1));
        let outcome = engine
            .poll_outpoint(&outpoint, &CancellationToken::never())
            .await;
        assert_eq!(outcome, PollOutcome::Found);
    }

    #[tokio::test]
    async fn test_snapshot_falls_back_to_local_values() {
        let mut graph = ContractGraph::new();
        let key = graph.insert_phantom(funding_template());
        let outpoint = {
            let utxo = graph.outputs_of(key)[0];
            graph.outpoint_of(utxo).unwrap()
        };
        let engine = engine_with(graph, MockOracle::new());
        engine.track(outpoint.clone()).await;

        let snapshot = engine.snapshot(&outpoint).await;
        assert!(snapshot.is_mock);
        assert_eq!(snapshot.amount, Satoshis::new(5000));
        assert_eq!(snapshot.address, crate::data_structures::UNKNOWN_ADDRESS);
        assert_eq!(snapshot.confirmations, None);
        assert!(snapshot.spends.is_empty());
    }
}
