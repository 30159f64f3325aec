//! The `Transport` seam and its two implementations.
//!
//! # Design
//! [`MockTransport`] and [`LiveTransport`] both implement [`Transport`], and
//! everything above this module holds an `Arc<dyn Transport>`. A transport
//! never interprets the status code: a 500 is a successful round-trip.

mod latency;
mod live;
mod mock;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub use latency::{FixedLatency, Latency, UniformLatency};
pub use live::LiveTransport;
pub use mock::{CannedResponse, MockTransport};

/// Sends one request and returns the raw response.
///
/// `#[async_trait]` keeps the trait dyn-compatible so it can sit behind
/// [`TransportPtr`].
#[async_trait]
pub trait Transport: Send + Sync {
    // ---
    /// Execute `request` once. No retries, no caching.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Shared handle to any transport.
pub type TransportPtr = Arc<dyn Transport>;
