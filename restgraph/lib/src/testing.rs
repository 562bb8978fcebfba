//! In-memory transport for exercising compiled proxies without a network.
//!
//! [`MockTransport`] answers requests from a table of canned responses keyed
//! by verb and URL and records every request it receives, so tests can
//! assert on exact request counts and bodies.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::{json, Value};

use crate::error::ClientError;
use crate::method::RestMethod;
use crate::transport::{HttpRequest, RawResponse, Transport};

/// A [`Transport`] that replays canned responses.
///
/// Requests with no registered route receive a `404` with a plain text body.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(RestMethod, String), RawResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the response for `method` on `url`, replacing any earlier
    /// one.
    pub fn on(&self, method: RestMethod, url: impl Into<String>, response: RawResponse) {
        lock(&self.routes).insert((method, url.into()), response);
    }

    /// Registers a `200` JSON envelope `{"status": true, "data": data}`.
    pub fn on_data(&self, method: RestMethod, url: impl Into<String>, data: Value) {
        let url = url.into();
        let body = json!({"status": true, "data": data});
        self.on(method, url.clone(), RawResponse::json(200, url, &body));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received for `method` on `url`.
    pub fn count(&self, method: RestMethod, url: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    /// Forgets recorded requests, keeping the routes.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> Result<RawResponse, ClientError> {
        let key = (request.method, request.url.clone());
        lock(&self.requests).push(request);

        let response = lock(&self.routes).get(&key).cloned();
        Ok(response.unwrap_or_else(|| {
            RawResponse::new(404, key.1)
                .with_content_type("text/plain")
                .with_body("no route")
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
