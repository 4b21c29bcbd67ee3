//! Asset cache manager lifecycle and fetch handling

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use reqwest::Url;
use serde::Serialize;
use tokio::task::JoinHandle;

use super::policy::RequestClass;
use crate::cache::CacheStore;
use crate::client::{HttpFetch, Request, Response, ResponseKind, endpoint};
use crate::config::Config;
use crate::error::{Error, FetchError, Result};

/// Manifest assets fetched at the same time during install
pub const INSTALL_CONCURRENCY: usize = 6;

/// Lifecycle of the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Active,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub cache_name: String,
    pub cached: Vec<String>,
    pub failed: Vec<AssetFailure>,
}

/// A manifest asset that could not be cached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetFailure {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub cache_name: String,
    /// Stores from other generations that were removed
    pub deleted: Vec<String>,
}

/// What the manager did with an intercepted request
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not answered; the request goes to the network unchanged.
    /// `wait_until` is a background cache fill that may outlive the request.
    Passthrough {
        class: RequestClass,
        wait_until: Option<JoinHandle<()>>,
    },
    /// Answered by the manager
    Responded(std::result::Result<Response, FetchError>),
}

/// A request as the client saw it, plus any background work it started
#[derive(Debug)]
pub struct Dispatched {
    pub class: RequestClass,
    pub response: std::result::Result<Response, FetchError>,
    pub background: Option<JoinHandle<()>>,
}

impl Dispatched {
    /// Wait for background work, then hand back the response
    pub async fn settle(self) -> std::result::Result<Response, FetchError> {
        if let Some(handle) = self.background {
            if let Err(e) = handle.await {
                debug!("Background cache task ended abnormally: {}", e);
            }
        }
        self.response
    }
}

/// Keeps a versioned offline copy of the dashboard's static assets.
///
/// Only governs fetches once activated and controlling. Cache and background
/// failures are logged and never reach the caller, except for a navigation
/// with neither network nor cached copy.
pub struct AssetCacheManager {
    fetcher: Arc<dyn HttpFetch>,
    store: Arc<dyn CacheStore>,
    origin: Url,
    cache_name: String,
    assets: Vec<String>,
    state: Mutex<WorkerState>,
    controlling: AtomicBool,
}

impl AssetCacheManager {
    pub fn new(
        fetcher: Arc<dyn HttpFetch>,
        store: Arc<dyn CacheStore>,
        origin: Url,
        cache_name: impl Into<String>,
        assets: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            origin,
            cache_name: cache_name.into(),
            assets,
            state: Mutex::new(WorkerState::Parsed),
            controlling: AtomicBool::new(false),
        }
    }

    pub fn from_config(
        fetcher: Arc<dyn HttpFetch>,
        store: Arc<dyn CacheStore>,
        config: &Config,
    ) -> Result<Self> {
        Ok(Self::new(
            fetcher,
            store,
            config.base_url()?,
            config.cache.cache_name(),
            config.cache.assets.clone(),
        ))
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn state(&self) -> WorkerState {
        *self.lock_state()
    }

    /// Whether fetches are governed by this manager
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: WorkerState) {
        debug!("Asset cache {} is {}", self.cache_name, state);
        *self.lock_state() = state;
    }

    fn begin(&self, from: WorkerState, to: WorkerState, action: &str) -> Result<()> {
        let mut state = self.lock_state();
        if *state != from {
            return Err(Error::Other(format!(
                "Cannot {} asset cache {} while {}",
                action, self.cache_name, *state
            )));
        }
        *state = to;
        Ok(())
    }

    /// Open the current store and populate it from the manifest.
    ///
    /// Each asset is best-effort: failures are reported and skipped. Only a
    /// store that cannot be opened fails the install.
    pub async fn install(&self) -> Result<InstallReport> {
        self.begin(WorkerState::Parsed, WorkerState::Installing, "install")?;
        info!("Installing asset cache {}", self.cache_name);

        if let Err(e) = self.store.open(&self.cache_name) {
            self.set_state(WorkerState::Parsed);
            return Err(e.into());
        }

        let results: Vec<(String, std::result::Result<(), String>)> = stream::iter(&self.assets)
            .map(|path| async move { (path.clone(), self.cache_asset(path).await) })
            .buffer_unordered(INSTALL_CONCURRENCY)
            .collect()
            .await;

        let mut report = InstallReport {
            cache_name: self.cache_name.clone(),
            cached: Vec::new(),
            failed: Vec::new(),
        };
        for (path, result) in results {
            match result {
                Ok(()) => report.cached.push(path),
                Err(reason) => report.failed.push(AssetFailure { path, reason }),
            }
        }

        if !report.failed.is_empty() {
            warn!(
                "Failed to cache {} of {} assets",
                report.failed.len(),
                self.assets.len()
            );
        }
        info!("Cached {} static assets", report.cached.len());

        // Installation proceeds straight to activation readiness
        self.set_state(WorkerState::Installed);
        Ok(report)
    }

    async fn cache_asset(&self, path: &str) -> std::result::Result<(), String> {
        let url = endpoint(&self.origin, path).map_err(|e| e.to_string())?;
        let request = Request::get(url);
        let response = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|e| e.to_string())?;

        if !response.is_success() {
            return Err(format!("HTTP {}", response.status));
        }
        self.store
            .put(&self.cache_name, &request, &response)
            .map_err(|e| e.to_string())
    }

    /// Delete every store except the current one, then take control of fetches.
    pub fn activate(&self) -> Result<ActivateReport> {
        self.begin(WorkerState::Installed, WorkerState::Activating, "activate")?;
        info!("Activating asset cache {}", self.cache_name);

        let mut deleted = Vec::new();
        match self.store.keys() {
            Ok(names) => {
                for name in names.into_iter().filter(|n| *n != self.cache_name) {
                    match self.store.delete(&name) {
                        Ok(true) => {
                            info!("Deleting old cache: {}", name);
                            deleted.push(name);
                        }
                        Ok(false) => {}
                        Err(e) => warn!("Failed to delete old cache {}: {}", name, e),
                    }
                }
            }
            Err(e) => warn!("Failed to list caches: {}", e),
        }

        self.claim();
        self.set_state(WorkerState::Active);
        Ok(ActivateReport {
            cache_name: self.cache_name.clone(),
            deleted,
        })
    }

    fn claim(&self) {
        self.controlling.store(true, Ordering::SeqCst);
        debug!("Asset cache {} now controls fetches", self.cache_name);
    }

    /// Install then activate immediately, without a waiting phase
    pub async fn start(&self) -> Result<(InstallReport, ActivateReport)> {
        let installed = self.install().await?;
        let activated = self.activate()?;
        Ok((installed, activated))
    }

    /// Pick up a store installed by an earlier run.
    ///
    /// Returns true and moves to `Installed` when the current store exists.
    pub fn resume(&self) -> Result<bool> {
        if self.state() != WorkerState::Parsed {
            return Ok(false);
        }
        let exists = self.store.keys()?.iter().any(|n| *n == self.cache_name);
        if exists {
            self.set_state(WorkerState::Installed);
        }
        Ok(exists)
    }

    /// Decide how an intercepted request is served
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        let class = RequestClass::of(request, &self.origin);

        if !self.is_controlling() {
            debug!("Not controlling, passing through {}", request.url);
            return FetchOutcome::Passthrough {
                class,
                wait_until: None,
            };
        }

        match class {
            RequestClass::Navigation => FetchOutcome::Responded(self.network_first(request).await),
            RequestClass::StaticAsset => FetchOutcome::Passthrough {
                class,
                wait_until: Some(self.spawn_fill(request.clone())),
            },
            RequestClass::CrossOrigin | RequestClass::Api | RequestClass::Other => {
                FetchOutcome::Passthrough {
                    class,
                    wait_until: None,
                }
            }
        }
    }

    /// Serve a request the way a controlled client would see it
    pub async fn dispatch(&self, request: &Request) -> Dispatched {
        let class = RequestClass::of(request, &self.origin);
        match self.handle_fetch(request).await {
            FetchOutcome::Responded(response) => Dispatched {
                class,
                response,
                background: None,
            },
            FetchOutcome::Passthrough { class, wait_until } => Dispatched {
                class,
                response: self.fetcher.fetch(request).await,
                background: wait_until,
            },
        }
    }

    /// Network first; on network failure, the most recent cached copy.
    ///
    /// Non-2xx responses are returned as-is and never stored.
    async fn network_first(&self, request: &Request) -> std::result::Result<Response, FetchError> {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    if let Err(e) = self.store.put(&self.cache_name, request, &response) {
                        warn!("Failed to cache {}: {}", request.url, e);
                    }
                }
                Ok(response)
            }
            Err(err) => {
                debug!("Network failed for {} ({}), trying cache", request.url, err);
                match self.store.lookup(request) {
                    Ok(Some(cached)) => {
                        info!("Serving cached copy of {}", request.url);
                        Ok(cached)
                    }
                    Ok(None) => Err(FetchError::NoCachedResponse(request.url.to_string())),
                    Err(e) => {
                        warn!("Cache lookup for {} failed: {}", request.url, e);
                        Err(FetchError::NoCachedResponse(request.url.to_string()))
                    }
                }
            }
        }
    }

    /// Fetch and store in the background. Never affects the original request.
    fn spawn_fill(&self, request: Request) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);
        let cache_name = self.cache_name.clone();

        tokio::spawn(async move {
            match fetcher.fetch(&request).await {
                Ok(response) if response.is_success() && response.kind == ResponseKind::Basic => {
                    if let Err(e) = store.put(&cache_name, &request, &response) {
                        debug!("Background cache of {} failed: {}", request.url, e);
                    }
                }
                Ok(response) => debug!(
                    "Not caching {} (status {}, {})",
                    request.url,
                    response.status,
                    response.kind.as_str()
                ),
                Err(e) => debug!("Background fetch of {} failed: {}", request.url, e),
            }
        })
    }
}
