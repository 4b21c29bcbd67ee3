//! Bounded-wait requests

use std::time::Duration;

use log::debug;

use super::{HttpFetch, Request, Response};
use crate::clock::Clock;
use crate::error::FetchError;

/// Fetch with a deadline.
///
/// Exactly one timer is taken from `clock` per call. Whichever branch wins,
/// the other future is dropped on return: a timeout aborts the in-flight
/// request and a response (or failure) cancels the timer.
pub async fn fetch_with_timeout(
    fetcher: &dyn HttpFetch,
    clock: &dyn Clock,
    request: &Request,
    timeout: Duration,
) -> Result<Response, FetchError> {
    let deadline = clock.sleep(timeout);

    tokio::select! {
        biased;

        result = fetcher.fetch(request) => result,
        () = deadline => {
            debug!("{} {} timed out after {:?}", request.method, request.url, timeout);
            Err(FetchError::Timeout(timeout))
        }
    }
}
