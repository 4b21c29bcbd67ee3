//! Recurring retry timer used while the backend is offline

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;

use super::state::ConnectivityWatch;
use crate::clock::Clock;

/// Default spacing between retries
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Single recurring timer that re-runs a poll while offline.
///
/// At most one timer task is alive at any time. The scheduler is the only
/// owner of the task handle; dropping the scheduler cancels the timer.
pub struct RetryScheduler {
    clock: Arc<dyn Clock>,
    interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RetryScheduler {
    pub fn new(clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            clock,
            interval,
            handle: Mutex::new(None),
        }
    }

    fn handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start the timer. No-op if already armed; returns whether a timer was started.
    ///
    /// Every tick re-checks `state` and only calls `tick` while offline. Each
    /// retry runs as its own task, so disarming from inside a retry never
    /// cancels that retry.
    pub fn arm<F, Fut>(&self, state: ConnectivityWatch, tick: F) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut handle = self.handle();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let clock = Arc::clone(&self.clock);
        let interval = self.interval;
        debug!("Arming retry timer every {:?}", interval);

        *handle = Some(tokio::spawn(async move {
            loop {
                clock.sleep(interval).await;
                if state.is_offline() {
                    info!("Retrying connection to server...");
                    tokio::spawn(tick());
                } else {
                    debug!("Retry tick skipped, backend is online");
                }
            }
        }));
        true
    }

    /// Cancel the timer. No-op if not armed; returns whether a timer was cancelled.
    pub fn disarm(&self) -> bool {
        match self.handle().take() {
            Some(handle) => {
                handle.abort();
                debug!("Retry timer disarmed");
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle().as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RetryScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{CountingClock, TokioClock};
    use crate::status::state::Connectivity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERVAL: Duration = Duration::from_secs(5);
    const JUST_AFTER: Duration = Duration::from_millis(10);

    fn counter() -> (
        Arc<AtomicUsize>,
        impl Fn() -> futures::future::Ready<()> + Send + Sync + 'static,
    ) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let tick = move || {
            c.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(())
        };
        (count, tick)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_while_offline() {
        let connectivity = Connectivity::new();
        connectivity.go_offline();
        let scheduler = RetryScheduler::new(Arc::new(TokioClock), INTERVAL);
        let (count, tick) = counter();

        assert!(scheduler.arm(connectivity.watch(), tick));

        tokio::time::sleep(INTERVAL * 3 + JUST_AFTER).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_is_idempotent() {
        let connectivity = Connectivity::new();
        connectivity.go_offline();
        let clock = CountingClock::new();
        let scheduler = RetryScheduler::new(Arc::new(clock.clone()), INTERVAL);
        let (count, _) = counter();

        for _ in 0..5 {
            let c = Arc::clone(&count);
            scheduler.arm(connectivity.watch(), move || {
                c.fetch_add(1, Ordering::SeqCst);
                futures::future::ready(())
            });
        }
        assert!(scheduler.is_armed());

        tokio::time::sleep(INTERVAL + JUST_AFTER).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        // One timer task: one pending sleep for the next interval
        assert_eq!(clock.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_arm_reports_noop() {
        let connectivity = Connectivity::new();
        let scheduler = RetryScheduler::new(Arc::new(TokioClock), INTERVAL);
        let (_, tick) = counter();
        let (_, other) = counter();

        assert!(scheduler.arm(connectivity.watch(), tick));
        assert!(!scheduler.arm(connectivity.watch(), other));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_stops_ticks() {
        let connectivity = Connectivity::new();
        connectivity.go_offline();
        let clock = CountingClock::new();
        let scheduler = RetryScheduler::new(Arc::new(clock.clone()), INTERVAL);
        let (count, tick) = counter();

        scheduler.arm(connectivity.watch(), tick);
        tokio::time::sleep(INTERVAL + JUST_AFTER).await;
        assert!(scheduler.disarm());
        assert!(!scheduler.is_armed());

        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(clock.pending(), 0);
    }

    #[tokio::test]
    async fn test_disarm_when_not_armed_is_noop() {
        let scheduler = RetryScheduler::new(Arc::new(TokioClock), INTERVAL);
        assert!(!scheduler.disarm());
        assert!(!scheduler.disarm());
        assert!(!scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_skipped_when_online() {
        let connectivity = Connectivity::new();
        connectivity.go_offline();
        let scheduler = RetryScheduler::new(Arc::new(TokioClock), INTERVAL);
        let (count, tick) = counter();

        scheduler.arm(connectivity.watch(), tick);
        connectivity.go_online();

        tokio::time::sleep(INTERVAL * 2 + JUST_AFTER).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        // Skipping does not cancel the timer; only disarm does.
        assert!(scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_after_disarm() {
        let connectivity = Connectivity::new();
        connectivity.go_offline();
        let scheduler = RetryScheduler::new(Arc::new(TokioClock), INTERVAL);
        let (count, tick) = counter();
        let (_, first) = counter();

        scheduler.arm(connectivity.watch(), first);
        scheduler.disarm();
        assert!(scheduler.arm(connectivity.watch(), tick));

        tokio::time::sleep(INTERVAL + JUST_AFTER).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let connectivity = Connectivity::new();
        connectivity.go_offline();
        let clock = CountingClock::new();
        let (count, tick) = counter();
        {
            let scheduler = RetryScheduler::new(Arc::new(clock.clone()), INTERVAL);
            scheduler.arm(connectivity.watch(), tick);
        }

        tokio::time::sleep(INTERVAL * 2).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(clock.pending(), 0);
    }
}
