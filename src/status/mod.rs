//! Backend status polling
//!
//! A [`StatusPoller`] queries the summary endpoint with a bounded wait, keeps
//! an online/offline state, and arms a single retry timer while offline.
//! Rendering goes through the [`ViewRenderer`] trait so the poller never
//! touches a terminal or a page directly.

pub mod poller;
pub mod retry;
pub mod state;
pub mod view;

pub use poller::{PollOutcome, PollerOptions, StatusPoller};
pub use retry::RetryScheduler;
pub use state::{ConnectivityState, ConnectivityWatch, Indicator};
pub use view::{NetworkView, Section, SummaryView, ViewRenderer};
