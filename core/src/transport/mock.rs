use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::{Latency, Transport};
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::Resource;

// ---------------------------------------------------------------------------
// CannedResponse
// ---------------------------------------------------------------------------

/// One row of the mock dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn to_response(&self) -> HttpResponse {
        let mut response = HttpResponse::new(self.status, self.body.clone());
        response
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        response
    }
}

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// In-process transport answering from a fixed URL → response table.
///
/// Lookup is plain string equality on `HttpRequest::url`; the method and
/// headers are ignored. Unknown URLs get the default row. Every call waits
/// `latency.next_delay()` on the tokio timer before answering, so
/// concurrently issued requests complete in no particular order.
///
/// The table is never mutated after construction, so one instance can serve
/// any number of concurrent calls.
#[derive(Debug)]
pub struct MockTransport {
    routes: HashMap<String, CannedResponse>,
    fallback: CannedResponse,
    latency: Box<dyn Latency>,
}

impl MockTransport {
    /// Empty table: every URL gets the default 500 `invalid_request` row.
    pub fn new(latency: impl Latency + 'static) -> Self {
        Self {
            routes: HashMap::new(),
            fallback: CannedResponse::new(500, r#"{"errors": ["invalid_request"]}"#),
            latency: Box::new(latency),
        }
    }

    /// The standard fixture table rooted at `base_url`.
    ///
    /// People and planets succeed, starships answer 401 with an empty
    /// object, and everything else (penguins included) falls through to the
    /// default row.
    pub fn fixtures(base_url: &str, latency: impl Latency + 'static) -> Self {
        let base = base_url.trim_end_matches('/');
        let url = |resource: Resource| format!("{base}/{}", resource.path());
        Self::new(latency)
            .with_route(
                url(Resource::People),
                CannedResponse::new(200, r#"{"name": "James Bond"}"#),
            )
            .with_route(
                url(Resource::Planets),
                CannedResponse::new(200, r#"{"name": "Yavin IV"}"#),
            )
            .with_route(url(Resource::Starships), CannedResponse::new(401, "{}"))
    }

    pub fn with_route(mut self, url: impl Into<String>, response: CannedResponse) -> Self {
        self.routes.insert(url.into(), response);
        self
    }

    pub fn with_default(mut self, response: CannedResponse) -> Self {
        self.fallback = response;
        self
    }

    /// The row `url` resolves to, without any delay.
    pub fn lookup(&self, url: &str) -> &CannedResponse {
        self.routes.get(url).unwrap_or(&self.fallback)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let canned = self.lookup(&request.url);
        let delay = self.latency.next_delay();
        debug!(url = %request.url, status = canned.status, ?delay, "mock transport answering");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(canned.to_response())
    }
}
