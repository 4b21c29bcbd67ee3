//! Status poller: summary requests, classification, and state transitions

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, error, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::retry::RetryScheduler;
use super::state::{Connectivity, ConnectivityState, ConnectivityWatch};
use super::view::{NetworkView, SummaryView, ViewRenderer};
use crate::client::{HttpFetch, IpReport, Request, Summary, endpoint, fetch_with_timeout};
use crate::clock::Clock;
use crate::error::FetchError;

/// Default bounded wait for one summary request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

pub const SUMMARY_PATH: &str = "/api/summary";
pub const IP_PATH: &str = "/api/ip";

/// Poller endpoints and timings
#[derive(Debug, Clone)]
pub struct PollerOptions {
    pub summary_url: Url,
    pub ip_url: Url,
    pub timeout: Duration,
    pub retry_interval: Duration,
}

impl PollerOptions {
    /// Standard endpoints under `base` with default timings
    pub fn for_base(base: &Url) -> Result<Self, FetchError> {
        Ok(Self {
            summary_url: endpoint(base, SUMMARY_PATH)?,
            ip_url: endpoint(base, IP_PATH)?,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_interval: super::retry::DEFAULT_RETRY_INTERVAL,
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}

/// Classified result of one poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Online(Box<Summary>),
    Offline(FetchError),
}

impl PollOutcome {
    pub fn state(&self) -> ConnectivityState {
        match self {
            PollOutcome::Online(_) => ConnectivityState::Online,
            PollOutcome::Offline(_) => ConnectivityState::Offline,
        }
    }
}

/// Polls the summary endpoint and keeps the online/offline indicator truthful.
///
/// Cloning is cheap; clones share the same state, timer and renderer.
/// Independent pollers never share state.
#[derive(Clone)]
pub struct StatusPoller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    fetcher: Arc<dyn HttpFetch>,
    clock: Arc<dyn Clock>,
    renderer: Arc<dyn ViewRenderer>,
    connectivity: Connectivity,
    retry: RetryScheduler,
    options: PollerOptions,
    /// Held while a completed poll applies its outcome. State, indicator and
    /// retry timer always come from the same poll.
    applying: Mutex<()>,
}

impl PollerInner {
    fn applying(&self) -> MutexGuard<'_, ()> {
        self.applying.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StatusPoller {
    pub fn new(
        fetcher: Arc<dyn HttpFetch>,
        clock: Arc<dyn Clock>,
        renderer: Arc<dyn ViewRenderer>,
        options: PollerOptions,
    ) -> Self {
        let retry = RetryScheduler::new(Arc::clone(&clock), options.retry_interval);
        Self {
            inner: Arc::new(PollerInner {
                fetcher,
                clock,
                renderer,
                connectivity: Connectivity::new(),
                retry,
                options,
                applying: Mutex::new(()),
            }),
        }
    }

    /// Current state; `None` until the first poll completes
    pub fn state(&self) -> Option<ConnectivityState> {
        self.inner.connectivity.current()
    }

    pub fn watch(&self) -> ConnectivityWatch {
        self.inner.connectivity.watch()
    }

    pub fn is_retry_armed(&self) -> bool {
        self.inner.retry.is_armed()
    }

    /// Query the summary endpoint once and apply the outcome.
    ///
    /// Overlapping polls are independent: each applies its own outcome when
    /// it completes, one at a time, so the state always reflects the most
    /// recently completed poll. Boxed so the retry timer can re-enter it.
    pub fn poll(&self) -> BoxFuture<'static, PollOutcome> {
        let poller = self.clone();
        Box::pin(async move { poller.poll_once().await })
    }

    async fn poll_once(&self) -> PollOutcome {
        match self.fetch_json::<Summary>(&self.inner.options.summary_url).await {
            Ok(summary) => {
                self.go_online(&summary);
                PollOutcome::Online(Box::new(summary))
            }
            Err(err) => {
                self.go_offline(&err);
                PollOutcome::Offline(err)
            }
        }
    }

    /// Refresh network addresses.
    ///
    /// Needs the summary's `isLocal` flag to pick the label. Failures are
    /// returned to the caller and never touch the connectivity state.
    pub async fn refresh_network(&self) -> Result<NetworkView, FetchError> {
        match self.load_network().await {
            Ok(view) => {
                self.inner.renderer.network(&view);
                Ok(view)
            }
            Err(err) => {
                warn!("Error refreshing IP: {}", err);
                Err(err)
            }
        }
    }

    async fn load_network(&self) -> Result<NetworkView, FetchError> {
        let summary = self
            .fetch_json::<Summary>(&self.inner.options.summary_url)
            .await?;
        let report = self.fetch_json::<IpReport>(&self.inner.options.ip_url).await?;
        Ok(NetworkView::from_report(summary.is_local(), &report))
    }

    /// Bounded GET classified into the error taxonomy.
    ///
    /// A 2xx response with a body that does not decode is a `Parse` failure
    /// and counts as offline like any other failure.
    async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let request = Request::get(url.clone());
        let response = fetch_with_timeout(
            self.inner.fetcher.as_ref(),
            self.inner.clock.as_ref(),
            &request,
            self.inner.options.timeout,
        )
        .await?;

        if !response.is_success() {
            return Err(FetchError::Http(response.status));
        }
        response.json()
    }

    fn go_online(&self, summary: &Summary) {
        let _applying = self.inner.applying();
        let transition = self.inner.connectivity.go_online();
        if transition.changed() {
            debug!("Backend is online");
        }
        self.inner.renderer.indicator(ConnectivityState::Online);
        self.inner.retry.disarm();

        let view = SummaryView::from_summary(summary.clone());
        debug!("Rendering {} panel", view.title);
        self.inner.renderer.summary(&view);
    }

    fn go_offline(&self, cause: &FetchError) {
        let _applying = self.inner.applying();
        self.inner.connectivity.go_offline();
        self.inner.renderer.indicator(ConnectivityState::Offline);

        match cause {
            FetchError::Timeout(_) => error!("Request timed out - server is likely down"),
            FetchError::Http(status) => error!("Server returned error status: {}", status),
            other => error!("Error fetching status: {}", other),
        }

        self.arm_retry();
    }

    fn arm_retry(&self) {
        let weak: Weak<PollerInner> = Arc::downgrade(&self.inner);
        self.inner
            .retry
            .arm(self.inner.connectivity.watch(), move || {
                let weak = Weak::clone(&weak);
                async move {
                    if let Some(inner) = weak.upgrade() {
                        StatusPoller { inner }.poll().await;
                    }
                }
            });
    }
}
