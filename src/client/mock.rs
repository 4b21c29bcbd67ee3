//! Scripted fetcher for testing
//!
//! Replies are configured per URL path. One-shot replies queued with
//! [`MockFetcher::push`] are consumed first; after that the standing reply set
//! with [`MockFetcher::set`] answers every call.
//!
//! # Example
//! ```ignore
//! let fetcher = MockFetcher::new();
//! fetcher.push("/api/summary", MockReply::status(500, ""));
//! fetcher.set("/api/summary", MockReply::status(200, SUMMARY_JSON));
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{HttpFetch, Request, Response};
use crate::error::FetchError;

/// Outcome of one mocked request
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(Response),
    Fail(FetchError),
    /// Never completes; only a timeout or drop ends the call
    Hang,
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    /// Same-origin response with a status and body
    pub fn status(status: u16, body: &str) -> Self {
        MockReply::Respond(Response::new(status, body))
    }

    pub fn network_down() -> Self {
        MockReply::Fail(FetchError::Network("connection refused".to_string()))
    }
}

#[derive(Default)]
struct Route {
    queued: VecDeque<MockReply>,
    standing: Option<MockReply>,
    calls: usize,
}

/// Mock fetcher for testing
#[derive(Default)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<Request>>,
    in_flight: Arc<AtomicUsize>,
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the standing reply for a path
    pub fn set(&self, path: &str, reply: MockReply) {
        let mut routes = self.routes.lock().unwrap();
        routes.entry(path.to_string()).or_default().standing = Some(reply);
    }

    /// Queue a one-shot reply for a path
    pub fn push(&self, path: &str, reply: MockReply) {
        let mut routes = self.routes.lock().unwrap();
        routes
            .entry(path.to_string())
            .or_default()
            .queued
            .push_back(reply);
    }

    /// Number of requests made to a path
    pub fn calls(&self, path: &str) -> usize {
        let routes = self.routes.lock().unwrap();
        routes.get(path).map(|r| r.calls).unwrap_or(0)
    }

    /// Total number of requests made
    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// All captured requests, in call order
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests started but neither finished nor dropped
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, request: &Request) -> Option<MockReply> {
        self.requests.lock().unwrap().push(request.clone());

        let mut routes = self.routes.lock().unwrap();
        let route = routes.entry(request.path().to_string()).or_default();
        route.calls += 1;
        route.queued.pop_front().or_else(|| route.standing.clone())
    }
}

#[async_trait]
impl HttpFetch for MockFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight(Arc::clone(&self.in_flight));

        let mut reply = self
            .next_reply(request)
            .unwrap_or_else(|| MockReply::Fail(FetchError::Network(format!(
                "no mock route for {}",
                request.path()
            ))));

        loop {
            match reply {
                MockReply::Respond(response) => return Ok(response),
                MockReply::Fail(err) => return Err(err),
                MockReply::Hang => std::future::pending::<()>().await,
                MockReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
