//! Timer source for everything that waits.
//!
//! Status polling never calls `tokio::time` directly; it asks a [`Clock`] for
//! a sleep. Production uses [`TokioClock`], tests either pause tokio time or
//! wrap it in a counting clock to observe timer leaks.

use std::time::Duration;

use futures::future::BoxFuture;

/// Source of cancellable timers.
///
/// Dropping the returned future cancels the timer.
pub trait Clock: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Clock backed by the tokio timer wheel
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(test)]
pub use counting::CountingClock;
