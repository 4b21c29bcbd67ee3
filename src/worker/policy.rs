//! Request classification for fetch interception

use reqwest::Url;
use serde::Serialize;

use crate::client::{Request, RequestMode};

/// How the asset cache treats an intercepted request.
///
/// Predicates apply in declaration order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestClass {
    /// Different origin: left alone
    CrossOrigin,
    /// Page load or the root path: network-first with cache fallback
    Navigation,
    /// `/api/`: never answered from cache
    Api,
    /// `/static/`: passed through, refreshed into the cache in the background
    StaticAsset,
    /// Anything else: left alone
    Other,
}

impl RequestClass {
    pub fn of(request: &Request, origin: &Url) -> Self {
        let path = request.path();

        if request.url.origin() != origin.origin() {
            RequestClass::CrossOrigin
        } else if request.mode == RequestMode::Navigate || path == "/" {
            RequestClass::Navigation
        } else if path.starts_with("/api/") {
            RequestClass::Api
        } else if path.starts_with("/static/") {
            RequestClass::StaticAsset
        } else {
            RequestClass::Other
        }
    }

    /// Whether the manager answers the request itself
    pub fn is_intercepted(&self) -> bool {
        matches!(self, RequestClass::Navigation)
    }
}

impl std::fmt::Display for RequestClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestClass::CrossOrigin => "cross-origin",
            RequestClass::Navigation => "navigation",
            RequestClass::Api => "api",
            RequestClass::StaticAsset => "static",
            RequestClass::Other => "other",
        };
        f.write_str(name)
    }
}
