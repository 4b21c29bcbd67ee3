//! HTTP access to the dashboard backend

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::key::request_key;
use crate::error::FetchError;

pub mod http;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod timeout;

pub use http::ReqwestFetcher;
#[cfg(test)]
pub use mock::{MockFetcher, MockReply};
pub use models::{ClientInfo, HostIp, IpReport, PublicIp, ServerInfo, Summary};
pub use timeout::fetch_with_timeout;

/// Performs a single network request.
///
/// Implementations return every HTTP status as a [`Response`]; only
/// transport-level failures become errors. Dropping the returned future
/// aborts the request.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// How a request was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    /// Script-initiated same-origin request
    #[default]
    SameOrigin,
    /// Script-initiated request that may leave the origin
    Cors,
}

/// A request as seen by fetchers and the asset cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::SameOrigin,
        }
    }

    pub fn navigate(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::Navigate,
        }
    }

    /// Request identity used as the cache key (method + URL)
    pub fn key(&self) -> String {
        request_key(self.method.as_str(), self.url.as_str())
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Origin class of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response
    Basic,
    /// Response from another origin
    Cors,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(ResponseKind::Basic),
            "cors" => Some(ResponseKind::Cors),
            _ => None,
        }
    }
}

/// Fully buffered response snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    /// Same-origin response with the given status and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            kind: ResponseKind::Basic,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

/// Resolve an absolute path against the backend base URL
pub fn endpoint(base: &Url, path: &str) -> Result<Url, FetchError> {
    base.join(path)
        .map_err(|e| FetchError::InvalidUrl(format!("{}{}: {}", base, path, e)))
}
