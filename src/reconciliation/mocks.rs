//! Mock oracle and artifact store for deterministic testing.
//!
//! These mocks let the reconciliation and wallet layers be tested without
//! a running node: responses are scripted, failures are injected per
//! operation, and `MockOracle` counts concurrent `get_utxo` calls per
//! outpoint so tests can assert the single-in-flight discipline.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::contract::{ArtifactId, ArtifactStore, ContractGraph};
use crate::data_structures::{OutPoint, Satoshis, TxId};
use crate::errors::{ArtifactError, OracleError, TrackerResult};
use crate::oracle::{ExternalUtxoView, NodeOracle, TxInfo};

/// Per-operation failure switches. Unlike one-shot failure injection, the
/// switches stay set until flipped back, so retry-forever behavior can be
/// observed across many ticks.
#[derive(Debug, Clone, Default)]
pub struct MockFailureModes {
    pub fail_get_utxo: bool,
    pub fail_list_transactions: bool,
    pub fail_check_balance: bool,
    pub fail_get_new_address: bool,
    pub fail_send: bool,
}

/// Scriptable in-memory oracle
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    utxos: Arc<Mutex<HashMap<String, ExternalUtxoView>>>,
    transactions: Arc<Mutex<Vec<TxInfo>>>,
    balance: Arc<Mutex<Satoshis>>,
    addresses: Arc<Mutex<VecDeque<String>>>,
    sent: Arc<Mutex<Vec<(Satoshis, String)>>>,
    next_send_seq: Arc<Mutex<u64>>,
    failure_modes: Arc<Mutex<MockFailureModes>>,
    latency: Arc<Mutex<Duration>>,
    in_flight: Arc<Mutex<HashMap<String, usize>>>,
    max_in_flight: Arc<Mutex<HashMap<String, usize>>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answer for an outpoint
    pub fn insert_utxo(&self, outpoint: &OutPoint, view: ExternalUtxoView) {
        self.utxos.lock().unwrap().insert(outpoint.key(), view);
    }

    /// Make the oracle forget an outpoint (subsequent fetches answer
    /// NotFound)
    pub fn remove_utxo(&self, outpoint: &OutPoint) {
        self.utxos.lock().unwrap().remove(&outpoint.key());
    }

    pub fn set_transactions(&self, transactions: Vec<TxInfo>) {
        *self.transactions.lock().unwrap() = transactions;
    }

    pub fn set_balance(&self, balance: Satoshis) {
        *self.balance.lock().unwrap() = balance;
    }

    pub fn push_address(&self, address: impl Into<String>) {
        self.addresses.lock().unwrap().push_back(address.into());
    }

    pub fn set_failure_modes(&self, modes: MockFailureModes) {
        *self.failure_modes.lock().unwrap() = modes;
    }

    pub fn fail_get_utxo(&self, fail: bool) {
        self.failure_modes.lock().unwrap().fail_get_utxo = fail;
    }

    /// Artificial delay applied inside `get_utxo`, for overlap tests
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Total `get_utxo` calls observed
    pub fn total_fetches(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }

    /// Highest number of concurrently in-flight `get_utxo` calls observed
    /// for one outpoint
    pub fn max_concurrent_fetches(&self, outpoint: &OutPoint) -> usize {
        self.max_in_flight
            .lock()
            .unwrap()
            .get(&outpoint.key())
            .copied()
            .unwrap_or(0)
    }

    /// Record of `send_to_address` calls
    pub fn sent(&self) -> Vec<(Satoshis, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn check(&self, failed: bool, operation: &str) -> TrackerResult<()> {
        if failed {
            return Err(OracleError::Unavailable(format!("mock failure: {operation}")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl NodeOracle for MockOracle {
    async fn get_utxo(&self, outpoint: &OutPoint) -> TrackerResult<Option<ExternalUtxoView>> {
        let key = outpoint.key();
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            let count = in_flight.entry(key.clone()).or_insert(0);
            *count += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            let entry = max.entry(key.clone()).or_insert(0);
            *entry = (*entry).max(*count);
        }
        *self.fetch_count.lock().unwrap() += 1;

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        {
            let mut in_flight = self.in_flight.lock().unwrap();
            if let Some(count) = in_flight.get_mut(&key) {
                *count -= 1;
            }
        }

        self.check(self.failure_modes.lock().unwrap().fail_get_utxo, "get_utxo")?;
        Ok(self.utxos.lock().unwrap().get(&key).cloned())
    }

    async fn list_transactions(&self, limit: usize) -> TrackerResult<Vec<TxInfo>> {
        self.check(
            self.failure_modes.lock().unwrap().fail_list_transactions,
            "list_transactions",
        )?;
        let transactions = self.transactions.lock().unwrap();
        Ok(transactions.iter().take(limit).cloned().collect())
    }

    async fn get_new_address(&self) -> TrackerResult<String> {
        self.check(
            self.failure_modes.lock().unwrap().fail_get_new_address,
            "get_new_address",
        )?;
        Ok(self
            .addresses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "bcrt1qmockaddress".to_string()))
    }

    async fn check_balance(&self) -> TrackerResult<Satoshis> {
        self.check(
            self.failure_modes.lock().unwrap().fail_check_balance,
            "check_balance",
        )?;
        Ok(*self.balance.lock().unwrap())
    }

    async fn send_to_address(&self, amount: Satoshis, address: &str) -> TrackerResult<TxId> {
        self.check(self.failure_modes.lock().unwrap().fail_send, "send_to_address")?;
        self.sent.lock().unwrap().push((amount, address.to_string()));
        let mut seq = self.next_send_seq.lock().unwrap();
        *seq += 1;
        Ok(TxId::new(format!("sent{seq}")))
    }
}

/// In-memory artifact store
#[derive(Debug, Clone, Default)]
pub struct MockArtifactStore {
    artifacts: Arc<Mutex<HashMap<String, ContractGraph>>>,
    trashed: Arc<Mutex<Vec<ArtifactId>>>,
    fail_list: Arc<Mutex<bool>>,
    fail_trash: Arc<Mutex<bool>>,
}

impl MockArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &ArtifactId, graph: ContractGraph) {
        self.artifacts.lock().unwrap().insert(id.to_string(), graph);
    }

    pub fn fail_list(&self, fail: bool) {
        *self.fail_list.lock().unwrap() = fail;
    }

    pub fn fail_trash(&self, fail: bool) {
        *self.fail_trash.lock().unwrap() = fail;
    }

    /// Artifacts moved to the trash, in trash order
    pub fn trashed(&self) -> Vec<ArtifactId> {
        self.trashed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MockArtifactStore {
    async fn list(&self) -> TrackerResult<Vec<ArtifactId>> {
        if *self.fail_list.lock().unwrap() {
            return Err(ArtifactError::Store("mock failure: list".to_string()).into());
        }
        let artifacts = self.artifacts.lock().unwrap();
        let mut ids: Vec<ArtifactId> = artifacts
            .keys()
            .filter_map(|key| key.parse().ok())
            .collect();
        ids.sort_by_key(|id: &ArtifactId| (id.created_ms(), id.to_string()));
        Ok(ids)
    }

    async fn trash(&self, id: &ArtifactId) -> TrackerResult<()> {
        if *self.fail_trash.lock().unwrap() {
            return Err(ArtifactError::Store("mock failure: trash".to_string()).into());
        }
        let removed = self.artifacts.lock().unwrap().remove(&id.to_string());
        if removed.is_none() {
            return Err(ArtifactError::NotFound(id.to_string()).into());
        }
        self.trashed.lock().unwrap().push(id.clone());
        Ok(())
    }

    async fn open(&self, id: &ArtifactId) -> TrackerResult<ContractGraph> {
        self.artifacts
            .lock()
            .unwrap()
            .get(&id.to_string())
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound(id.to_string()).into())
    }
}
