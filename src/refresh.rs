//! Fixed-interval quote refresh for a single symbol.
//!
//! [`RefreshLoop::run`] is the loop itself: fetch through the shared
//! [`QuoteCache`], deliver, sleep, repeat until `should_stop` says otherwise.
//! [`RefreshLoop::spawn`] runs the same loop on a tokio task and hands back a
//! [`RefreshHandle`] with an update channel and a stop flag.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::error::QuoteError;
use crate::core::quote::Quote;
use crate::core::symbol::Symbol;
use crate::providers::caching::QuoteCache;

pub type QuoteUpdate = Result<Quote, QuoteError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

impl LoopState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoopState::Idle,
            1 => LoopState::Running,
            _ => LoopState::Stopped,
        }
    }
}

pub struct RefreshLoop {
    cache: Arc<QuoteCache>,
    symbol: Symbol,
    interval: Duration,
    ttl: Duration,
    state: AtomicU8,
}

impl RefreshLoop {
    pub fn new(cache: Arc<QuoteCache>, symbol: Symbol, interval: Duration, ttl: Duration) -> Self {
        RefreshLoop {
            cache,
            symbol,
            interval,
            ttl,
            state: AtomicU8::new(LoopState::Idle as u8),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Runs until `should_stop` returns true.
    ///
    /// `should_stop` is polled before every fetch and again before every
    /// delivery, so nothing reaches `on_update` once it has reported true.
    /// Fetch failures are delivered as `Err` and do not end the loop. A loop
    /// that has already stopped returns immediately.
    pub async fn run<F, S>(&self, mut on_update: F, mut should_stop: S)
    where
        F: FnMut(QuoteUpdate),
        S: FnMut() -> bool,
    {
        if self
            .state
            .compare_exchange(
                LoopState::Idle as u8,
                LoopState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            warn!(symbol = %self.symbol, state = ?self.state(), "Refresh loop cannot start");
            return;
        }
        info!(symbol = %self.symbol, interval = ?self.interval, "Refresh loop running");

        let mut ticks: u64 = 0;
        loop {
            if should_stop() {
                break;
            }
            let update = self.cache.get_symbol(&self.symbol, self.ttl).await;
            if should_stop() {
                break;
            }
            ticks += 1;
            if let Err(e) = &update {
                debug!(symbol = %self.symbol, tick = ticks, error = %e, "Delivering failure");
            }
            on_update(update);
            tokio::time::sleep(self.interval).await;
        }

        self.state.store(LoopState::Stopped as u8, Ordering::SeqCst);
        info!(symbol = %self.symbol, ticks, "Refresh loop stopped");
    }

    /// Starts the loop on a tokio task.
    ///
    /// Dropping the handle's receiver also stops the loop at its next check.
    pub fn spawn(self) -> RefreshHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let refresh = Arc::new(self);

        let task = {
            let stop = Arc::clone(&stop);
            let refresh = Arc::clone(&refresh);
            tokio::spawn(async move {
                let closed = tx.clone();
                refresh
                    .run(
                        move |update| {
                            // a closed channel is noticed by the stop check below
                            let _ = tx.send(update);
                        },
                        move || stop.load(Ordering::SeqCst) || closed.is_closed(),
                    )
                    .await;
            })
        };

        RefreshHandle {
            updates: rx,
            stop,
            refresh,
            task,
        }
    }
}

pub struct RefreshHandle {
    updates: mpsc::UnboundedReceiver<QuoteUpdate>,
    stop: Arc<AtomicBool>,
    refresh: Arc<RefreshLoop>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Next update, or `None` once the loop has stopped and the queue is drained.
    pub async fn recv(&mut self) -> Option<QuoteUpdate> {
        self.updates.recv().await
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> LoopState {
        self.refresh.state()
    }

    /// Requests a stop and waits for the task to finish.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        self.stop();
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::caching::tests::CountingProvider;
    use std::sync::atomic::AtomicUsize;

    const TICK: Duration = Duration::from_millis(5);

    fn refresh_loop(provider: Arc<CountingProvider>, ttl: Duration) -> RefreshLoop {
        let cache = Arc::new(QuoteCache::new(provider));
        RefreshLoop::new(cache, Symbol::parse("NVDA").unwrap(), TICK, ttl)
    }

    #[tokio::test]
    async fn test_run_delivers_in_fetch_order_until_stopped() {
        let provider = CountingProvider::new(100.0);
        let refresh = refresh_loop(provider.clone(), Duration::ZERO);
        assert_eq!(refresh.state(), LoopState::Idle);

        let mut updates = Vec::new();
        let mut polls = 0;
        refresh
            .run(
                |update| updates.push(update.unwrap()),
                || {
                    polls += 1;
                    polls > 10
                },
            )
            .await;

        assert_eq!(refresh.state(), LoopState::Stopped);
        assert_eq!(updates.len(), 5);
        assert_eq!(provider.calls(), 5);
        for pair in updates.windows(2) {
            assert!(pair[0].observed_at <= pair[1].observed_at);
            assert!(pair[0].price < pair[1].price);
        }
    }

    #[tokio::test]
    async fn test_no_update_after_stop_reports_true() {
        let provider = CountingProvider::new(100.0);
        let refresh = refresh_loop(provider.clone(), Duration::ZERO);

        let delivered = AtomicUsize::new(0);
        let stopped = AtomicBool::new(false);
        refresh
            .run(
                |_| {
                    assert!(!stopped.load(Ordering::SeqCst), "update after stop");
                    if delivered.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                        stopped.store(true, Ordering::SeqCst);
                    }
                },
                || stopped.load(Ordering::SeqCst),
            )
            .await;

        assert_eq!(delivered.load(Ordering::SeqCst), 3);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_stop_before_first_tick_fetches_nothing() {
        let provider = CountingProvider::new(100.0);
        let refresh = refresh_loop(provider.clone(), Duration::ZERO);

        let mut delivered = 0;
        refresh.run(|_| delivered += 1, || true).await;

        assert_eq!(delivered, 0);
        assert_eq!(provider.calls(), 0);
        assert_eq!(refresh.state(), LoopState::Stopped);

        // a stopped loop stays stopped
        refresh.run(|_| delivered += 1, || false).await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_failures_are_delivered_without_ending_the_loop() {
        let provider = CountingProvider::new(100.0);
        provider.fail.store(true, Ordering::SeqCst);
        let refresh = refresh_loop(provider.clone(), Duration::ZERO);

        let mut updates = Vec::new();
        let delivered = AtomicUsize::new(0);
        refresh
            .run(
                |update| {
                    updates.push(update);
                    if delivered.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                        provider.fail.store(false, Ordering::SeqCst);
                    }
                },
                || delivered.load(Ordering::SeqCst) >= 3,
            )
            .await;

        assert_eq!(updates.len(), 3);
        assert!(matches!(updates[0], Err(QuoteError::DataUnavailable { .. })));
        assert!(matches!(updates[1], Err(QuoteError::DataUnavailable { .. })));
        assert!(updates[2].is_ok());
    }

    #[tokio::test]
    async fn test_ticks_inside_ttl_reuse_cached_quote() {
        let provider = CountingProvider::new(100.0);
        let refresh = refresh_loop(provider.clone(), Duration::from_secs(60));

        let mut updates = Vec::new();
        let delivered = AtomicUsize::new(0);
        refresh
            .run(
                |update| {
                    updates.push(update.unwrap());
                    delivered.fetch_add(1, Ordering::SeqCst);
                },
                || delivered.load(Ordering::SeqCst) >= 4,
            )
            .await;

        assert_eq!(provider.calls(), 1);
        assert!(updates.iter().all(|q| *q == updates[0]));
    }

    #[tokio::test]
    async fn test_spawned_loop_streams_until_stopped() {
        let provider = CountingProvider::new(100.0);
        let mut handle = refresh_loop(provider.clone(), Duration::ZERO).spawn();

        let first = handle.recv().await.unwrap().unwrap();
        let second = handle.recv().await.unwrap().unwrap();
        assert!(first.observed_at <= second.observed_at);
        assert_eq!(handle.state(), LoopState::Running);

        handle.stop();
        let refresh = Arc::clone(&handle.refresh);
        handle.shutdown().await.unwrap();
        assert_eq!(refresh.state(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn test_spawned_loop_ends_when_receiver_dropped() {
        let provider = CountingProvider::new(100.0);
        let handle = refresh_loop(provider.clone(), Duration::ZERO).spawn();

        let RefreshHandle {
            updates,
            refresh,
            task,
            ..
        } = handle;
        drop(updates);
        task.await.unwrap();
        assert_eq!(refresh.state(), LoopState::Stopped);
    }
}
