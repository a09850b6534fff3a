//! Interval poll loops with explicit ownership and cancellation.
//!
//! A poll loop is a spawned task: fetch, apply, sleep, repeat until the
//! owning view cancels it. The cancellation token is consulted on entry,
//! immediately after each tick resolves, and immediately after each
//! sleep, so teardown never leaks a timer and never applies a stale
//! result to a model no view still observes.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::cancellation::{CancellationHandle, CancellationToken};

/// Handle to a running poll loop, owned by the view that started it
#[derive(Debug)]
pub struct PollHandle {
    handle: CancellationHandle,
    join: JoinHandle<()>,
}

impl PollHandle {
    /// Request cancellation without waiting for the loop to exit
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel and wait for the loop to exit. The inter-cycle sleep is
    /// interrupted by cancellation, so this returns promptly.
    pub async fn stop(self) {
        self.handle.cancel();
        let _ = self.join.await;
    }
}

/// Spawn a loop that runs `tick` then sleeps `interval`, until cancelled.
///
/// The tick receives a clone of the loop's token so it can discard work
/// that resolves after cancellation was requested.
pub fn spawn_poll_loop<F, Fut>(interval: Duration, mut tick: F) -> PollHandle
where
    F: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (token, handle) = CancellationToken::pair();
    let join = tokio::spawn(async move {
        loop {
            if token.is_cancelled() {
                break;
            }
            tick(token.clone()).await;
            if token.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = token.cancelled() => {}
            }
            if token.is_cancelled() {
                break;
            }
        }
    });
    PollHandle { handle, join }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_loop_ticks_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let handle = spawn_poll_loop(Duration::from_millis(10), move |_token| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.stop().await;
        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several ticks, saw {seen}");

        // No further ticks after stop.
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn test_stop_interrupts_the_sleep() {
        let handle = spawn_poll_loop(Duration::from_secs(3600), |_token| async {});
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Must return promptly despite the hour-long interval.
        tokio::time::timeout(Duration::from_secs(1), handle.stop())
            .await
            .expect("stop should not wait out the sleep");
    }

    #[tokio::test]
    async fn test_tick_sees_cancellation_mid_flight() {
        let applied = Arc::new(AtomicUsize::new(0));
        let counter = applied.clone();
        let handle = spawn_poll_loop(Duration::from_millis(10), move |token| {
            let counter = counter.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                if token.is_cancelled() {
                    return;
                }
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Cancel while the first tick is suspended in its fetch.
        tokio::time::sleep(Duration::from_millis(15)).await;
        handle.stop().await;
        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }
}
