//! Configuration management for homedash

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Static assets cached when the asset cache installs.
///
/// The page itself is not listed: navigations use network-first and are
/// stored on first successful load.
pub const DEFAULT_ASSETS: &[&str] = &[
    "/static/js/core.js",
    "/static/js/graphs.js",
    "/static/js/app.js",
    "/static/js/layout.js",
    "/static/js/preferences.js",
    "/static/js/modules/system.js",
    "/static/js/modules/weather.js",
    "/static/js/modules/network.js",
    "/static/js/modules/search.js",
    "/static/js/modules/github.js",
    "/static/js/modules/rss.js",
    "/static/js/modules/quicklinks.js",
    "/static/js/modules/monitoring.js",
    "/static/js/modules/snmp.js",
    "/static/js/modules/calendar.js",
    "/static/js/modules/todo.js",
    "/static/js/modules/config.js",
];

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Dashboard backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bounded wait for a single status request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Interval of the retry timer while offline
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    /// Interval of the regular status refresh in `watch`
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Interval of the network information refresh in `watch`
    #[serde(default = "default_ip_refresh_interval_secs")]
    pub ip_refresh_interval_secs: u64,

    /// Asset cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Asset cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store name prefix; the version is appended
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,

    /// Cache generation tag. Changing it invalidates every stored asset.
    #[serde(default = "default_cache_version")]
    pub version: String,

    /// Storage directory (defaults to the platform cache dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Asset manifest populated on install
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_retry_interval_secs() -> u64 {
    5
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_ip_refresh_interval_secs() -> u64 {
    300
}

fn default_cache_prefix() -> String {
    "homepage-static".to_string()
}

fn default_cache_version() -> String {
    "v3".to_string()
}

fn default_assets() -> Vec<String> {
    DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: default_cache_prefix(),
            version: default_cache_version(),
            dir: None,
            assets: default_assets(),
        }
    }
}

impl CacheConfig {
    /// Name of the current cache generation's store, e.g. `homepage-static-v3`
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.prefix, self.version)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            retry_interval_secs: default_retry_interval_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            ip_refresh_interval_secs: default_ip_refresh_interval_secs(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".homedash").join("config.yaml"))
    }

    /// Resolve the config path from an explicit override or the default
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Check that the values can actually drive a poller
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be positive".into()).into());
        }
        if self.retry_interval_secs == 0 {
            return Err(ConfigError::Invalid("retry_interval_secs must be positive".into()).into());
        }
        if self.cache.version.trim().is_empty() {
            return Err(ConfigError::Invalid("cache.version must not be empty".into()).into());
        }
        Ok(())
    }

    /// Parsed backend base URL
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            ConfigError::Invalid(format!("base_url '{}': {}", self.base_url, e)).into()
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn ip_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.ip_refresh_interval_secs.max(1))
    }
}
