//! Command execution context
//!
//! Loads configuration once, applies global overrides, and builds the
//! fetcher, poller, renderer, and cache store that commands share.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Url;

use crate::cache::CacheStorage;
use crate::cli::{Cli, OutputFormat};
use crate::client::{HttpFetch, ReqwestFetcher};
use crate::clock::TokioClock;
use crate::config::Config;
use crate::error::Result;
use crate::output::{JsonRenderer, TerminalRenderer};
use crate::status::{PollerOptions, StatusPoller, ViewRenderer};
use crate::worker::AssetCacheManager;

/// Global CLI options passed to all command handlers.
///
/// Precedence: CLI flag > environment variable > config file > default.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub format: OutputFormat,
    /// Backend URL override
    pub url: Option<String>,
    /// Custom config file path (defaults to ~/.homedash/config.yaml)
    pub config: Option<String>,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            url: cli.url.clone(),
            config: cli.config.clone(),
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Config file contents with the URL override applied
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_at(self.config_ref())?;
        if let Some(url) = &self.url {
            config.base_url = url.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Context for command execution
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub base_url: Url,
    pub fetcher: Arc<dyn HttpFetch>,
}

impl CommandContext {
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = opts.load_config()?;
        let base_url = config.base_url()?;
        let fetcher = Arc::new(ReqwestFetcher::new(base_url.clone())?);

        Ok(Self {
            config,
            format: opts.format,
            base_url,
            fetcher,
        })
    }

    /// Renderer matching the output format
    pub fn renderer(&self) -> Arc<dyn ViewRenderer> {
        match self.format {
            OutputFormat::Pretty => Arc::new(TerminalRenderer),
            OutputFormat::Json => Arc::new(JsonRenderer),
        }
    }

    pub fn poller(&self) -> Result<StatusPoller> {
        let options = PollerOptions::for_base(&self.base_url)?
            .timeout(self.config.request_timeout())
            .retry_interval(self.config.retry_interval());

        Ok(StatusPoller::new(
            Arc::clone(&self.fetcher),
            Arc::new(TokioClock),
            self.renderer(),
            options,
        ))
    }

    /// Cache directory from config, or the platform default
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.config.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(CacheStorage::cache_dir()?),
        }
    }

    pub fn open_store(&self) -> Result<Arc<CacheStorage>> {
        Ok(Arc::new(CacheStorage::open_at(&self.cache_dir()?)?))
    }

    pub fn asset_manager(&self, store: Arc<CacheStorage>) -> Result<AssetCacheManager> {
        AssetCacheManager::from_config(Arc::clone(&self.fetcher), store, &self.config)
    }
}
