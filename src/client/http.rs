//! reqwest-backed fetcher

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::Url;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};

use super::{HttpFetch, Request, Response, ResponseKind};
use crate::error::FetchError;

/// Upper bound for any single request, including asset downloads.
///
/// Status polls use a much shorter bound through
/// [`fetch_with_timeout`](super::fetch_with_timeout).
const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetcher for the dashboard backend
pub struct ReqwestFetcher {
    http: HttpClient,
    origin: Url,
}

impl ReqwestFetcher {
    /// Create a fetcher whose same-origin responses are classified against `origin`
    pub fn new(origin: Url) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(TRANSPORT_TIMEOUT)
            .user_agent(concat!("homedash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { http, origin })
    }

    fn kind_of(&self, url: &Url) -> ResponseKind {
        if url.origin() == self.origin.origin() {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        log::debug!("{} {}", request.method, request.url);

        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status().as_u16();
        let kind = self.kind_of(response.url());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(Response {
            status,
            kind,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_non_success_status_as_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/summary")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let fetcher = ReqwestFetcher::new(base.clone()).unwrap();
        let request = Request::get(base.join("/api/summary").unwrap());

        let response = fetcher.fetch(&request).await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.text(), "boom");
        assert_eq!(response.kind, ResponseKind::Basic);
    }

    #[tokio::test]
    async fn test_fetch_captures_content_type() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/static/js/app.js")
            .with_status(200)
            .with_header("content-type", "application/javascript")
            .with_body("console.log(1)")
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let fetcher = ReqwestFetcher::new(base.clone()).unwrap();
        let response = fetcher
            .fetch(&Request::get(base.join("/static/js/app.js").unwrap()))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(
            response.content_type.as_deref(),
            Some("application/javascript")
        );
    }

    #[tokio::test]
    async fn test_foreign_origin_is_cors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/x")
            .with_status(200)
            .create_async()
            .await;

        let fetcher = ReqwestFetcher::new(Url::parse("http://dash.invalid").unwrap()).unwrap();
        let url = Url::parse(&server.url()).unwrap().join("/x").unwrap();
        let response = fetcher.fetch(&Request::get(url)).await.unwrap();
        assert_eq!(response.kind, ResponseKind::Cors);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop a listener to get a port nobody is serving.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let base = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
        let fetcher = ReqwestFetcher::new(base.clone()).unwrap();
        let err = fetcher
            .fetch(&Request::get(base.join("/api/summary").unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
