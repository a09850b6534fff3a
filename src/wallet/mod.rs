//! Wallet-facing node views: balance, send history, compiled contracts.
//!
//! Each view the rendering layer shows is backed by its own poll loop:
//! fetch from the oracle or artifact store, apply the result to a shared
//! snapshot, sleep, repeat. The loops are owned by the monitor and
//! cancelled on teardown. Fetch failures are absorbed: the snapshot
//! resets to its empty value, a warning is logged, and the loop keeps
//! polling.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use crate::contract::{ArtifactId, ArtifactStore};
use crate::data_structures::{Satoshis, TxId};
use crate::errors::TrackerResult;
use crate::oracle::{NodeOracle, TxInfo};
use crate::reconciliation::{spawn_poll_loop, PollHandle};

/// Configuration for the wallet view poll loops
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Interval between poll ticks
    pub poll_interval: Duration,
    /// How many history entries to request per tick
    pub history_limit: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            history_limit: 10,
        }
    }
}

/// Owns the wallet view poll loops and their shared snapshots
pub struct WalletMonitor {
    oracle: Arc<dyn NodeOracle>,
    artifacts: Arc<dyn ArtifactStore>,
    config: WalletConfig,
    balance: Arc<RwLock<Satoshis>>,
    history: Arc<RwLock<Vec<TxInfo>>>,
    contracts: Arc<RwLock<Vec<ArtifactId>>>,
    watchers: Vec<PollHandle>,
}

impl WalletMonitor {
    pub fn new(
        oracle: Arc<dyn NodeOracle>,
        artifacts: Arc<dyn ArtifactStore>,
        config: WalletConfig,
    ) -> Self {
        Self {
            oracle,
            artifacts,
            config,
            balance: Arc::new(RwLock::new(Satoshis::ZERO)),
            history: Arc::new(RwLock::new(Vec::new())),
            contracts: Arc::new(RwLock::new(Vec::new())),
            watchers: Vec::new(),
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Spawn the balance, history, and contract-list loops. A second call
    /// is a no-op while the first set of loops is alive.
    pub fn start(&mut self) {
        if !self.watchers.is_empty() {
            return;
        }
        let interval = self.config.poll_interval;

        let oracle = self.oracle.clone();
        let balance = self.balance.clone();
        self.watchers.push(spawn_poll_loop(interval, move |token| {
            let oracle = oracle.clone();
            let balance = balance.clone();
            async move {
                let fetched = oracle.check_balance().await;
                if token.is_cancelled() {
                    return;
                }
                match fetched {
                    Ok(amount) => *balance.write().await = amount,
                    Err(err) => {
                        warn!(error = %err, "balance poll failed");
                        *balance.write().await = Satoshis::ZERO;
                    }
                }
            }
        }));

        let oracle = self.oracle.clone();
        let history = self.history.clone();
        let limit = self.config.history_limit;
        self.watchers.push(spawn_poll_loop(interval, move |token| {
            let oracle = oracle.clone();
            let history = history.clone();
            async move {
                let fetched = oracle.list_transactions(limit).await;
                if token.is_cancelled() {
                    return;
                }
                match fetched {
                    Ok(transactions) => *history.write().await = transactions,
                    Err(err) => {
                        warn!(error = %err, "transaction history poll failed");
                        history.write().await.clear();
                    }
                }
            }
        }));

        let artifacts = self.artifacts.clone();
        let contracts = self.contracts.clone();
        self.watchers.push(spawn_poll_loop(interval, move |token| {
            let artifacts = artifacts.clone();
            let contracts = contracts.clone();
            async move {
                let fetched = artifacts.list().await;
                if token.is_cancelled() {
                    return;
                }
                match fetched {
                    Ok(ids) => *contracts.write().await = ids,
                    Err(err) => {
                        warn!(error = %err, "contract list poll failed");
                        contracts.write().await.clear();
                    }
                }
            }
        }));
    }

    /// Cancel every loop and wait for them to exit
    pub async fn stop(&mut self) {
        for watcher in self.watchers.drain(..) {
            watcher.stop().await;
        }
    }

    pub fn is_running(&self) -> bool {
        !self.watchers.is_empty()
    }

    pub async fn balance(&self) -> Satoshis {
        *self.balance.read().await
    }

    pub async fn history(&self) -> Vec<TxInfo> {
        self.history.read().await.clone()
    }

    pub async fn contracts(&self) -> Vec<ArtifactId> {
        self.contracts.read().await.clone()
    }

    /// User-initiated spend; the error, if any, propagates to the caller
    pub async fn send_to_address(&self, amount: Satoshis, address: &str) -> TrackerResult<TxId> {
        self.oracle.send_to_address(amount, address).await
    }

    pub async fn get_new_address(&self) -> TrackerResult<String> {
        self.oracle.get_new_address().await
    }

    /// User-initiated artifact deletion; errors propagate
    pub async fn trash_contract(&self, id: &ArtifactId) -> TrackerResult<()> {
        self.artifacts.trash(id).await
    }
}
