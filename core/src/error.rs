//! Error types for transports and the response pipeline.
//!
//! # Design
//! `TransportError` only covers failures to complete a round-trip at all.
//! Once a status code exists the transport has succeeded, and the pipeline
//! decides between `Service`, `Decode` and `MalformedErrorBody`. The last one
//! gets its own variant so an unreadable error body is never mistaken for a
//! generic failure.

use thiserror::Error;

use crate::types::ServiceError;

/// Connectivity-level failures raised by a `Transport`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The worker executing the request panicked or was torn down.
    #[error("transport worker failed: {0}")]
    Worker(String),
}

/// Every terminal error a fetch can produce.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-2xx status with a well-formed error body.
    #[error("service returned HTTP {status}: {error}")]
    Service { status: u16, error: ServiceError },

    /// 2xx status whose body did not match the expected shape.
    #[error("failed to decode HTTP {status} body: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// Non-2xx status whose body is not a `ServiceError` either.
    #[error("HTTP {status} with unreadable error body {body:?}: {source}")]
    MalformedErrorBody {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// HTTP status attached to the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport(_) => None,
            FetchError::Service { status, .. }
            | FetchError::Decode { status, .. }
            | FetchError::MalformedErrorBody { status, .. } => Some(*status),
        }
    }

    /// Stable short name, used in logs and test vectors.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "Transport",
            FetchError::Service { .. } => "Service",
            FetchError::Decode { .. } => "Decode",
            FetchError::MalformedErrorBody { .. } => "MalformedErrorBody",
        }
    }
}
