//! Asynchronous fetch layer for a small set of named JSON resources.
//!
//! # Overview
//! A `FetchManager` turns each named resource into an `HttpRequest`, sends it
//! through a `Transport`, classifies the raw response into a typed value or a
//! typed error, and delivers the result through a cancellable `FetchHandle`.
//!
//! # Design
//! - `Transport` is the only I/O seam. `MockTransport` answers from a fixed
//!   table after an injected delay; `LiveTransport` performs the real HTTP
//!   round-trip. Neither interprets status codes.
//! - `pipeline::classify` is a pure `(status, body)` function: 2xx decodes the
//!   target type, anything else decodes a `ServiceError`.
//! - `FetchHandle` delivers exactly one `Outcome` unless cancelled first.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod config;
pub mod error;
pub mod handle;
pub mod http;
pub mod manager;
pub mod pipeline;
pub mod transport;
pub mod types;

pub use config::{FetchConfig, LatencyConfig};
pub use error::{FetchError, TransportError};
pub use handle::{Completion, FetchHandle, Outcome, Phase};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use manager::{FetchManager, Recovery};
pub use pipeline::classify;
pub use transport::{
    CannedResponse, FixedLatency, Latency, LiveTransport, MockTransport, Transport, TransportPtr,
    UniformLatency,
};
pub use types::{ErrorCode, Resource, Response, ServiceError};
