//! The seam between lazy records and the remote data provider.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{FetchError, FetchFailure};
use crate::target::RequestTarget;

/// Source of structured records.
///
/// Implementations perform exactly one attempt per call. Unreachable hosts,
/// non-success statuses and undecodable bodies are all reported as
/// [`FetchError`]; retrying is left to callers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &RequestTarget) -> Result<Value, FetchError>;
}

/// In-memory fetcher serving canned responses.
///
/// A response registered for a full target URL wins over one registered for
/// its path alone. Every request is logged, which makes the fetcher useful for
/// asserting how often and with which targets records were loaded.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    routes: Mutex<HashMap<String, Result<Value, FetchFailure>>>,
    requests: Mutex<Vec<String>>,
    count: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for a full target URL or a URL path such as
    /// `/api/wow/guild/bar/foo`.
    pub fn respond(&self, route: impl Into<String>, body: Value) -> &Self {
        self.routes.lock().insert(route.into(), Ok(body));
        self
    }

    pub fn fail(&self, route: impl Into<String>, failure: FetchFailure) -> &Self {
        self.routes.lock().insert(route.into(), Err(failure));
        self
    }

    /// Number of fetches served so far, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Targets requested so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<String> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, target: &RequestTarget) -> Result<Value, FetchError> {
        self.count.fetch_add(1, Ordering::AcqRel);
        self.requests.lock().push(target.as_str().to_string());

        let routes = self.routes.lock();
        let response = routes
            .get(target.as_str())
            .or_else(|| routes.get(target.url().path()))
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchFailure::Status {
                    code: 404,
                    reason: Some("no route registered".to_string()),
                })
            });

        response.map_err(|failure| FetchError::new(target.as_str(), failure))
    }
}
