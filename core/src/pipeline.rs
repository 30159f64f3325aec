//! Turns raw transport output into a typed value or a typed error.
//!
//! # Design
//! `classify` is a pure function of `(status, body)`: no transport, no clock.
//! A 2xx body is decoded as the caller's `T` and nothing else. Any other
//! status is decoded as a `ServiceError` and nothing else; if that fails too
//! the result is `MalformedErrorBody`, never a silent fallback.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::http::{is_success, HttpRequest};
use crate::transport::Transport;
use crate::types::ServiceError;

/// Classify one response.
pub fn classify<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, FetchError> {
    if is_success(status) {
        return serde_json::from_slice(body).map_err(|source| FetchError::Decode { status, source });
    }
    match serde_json::from_slice::<ServiceError>(body) {
        Ok(error) => Err(FetchError::Service { status, error }),
        Err(source) => Err(FetchError::MalformedErrorBody {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
            source,
        }),
    }
}

/// Send `request` through `transport` and classify the response.
pub async fn fetch<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: &HttpRequest,
) -> Result<T, FetchError> {
    debug!(method = request.method.as_str(), url = %request.url, "sending request");
    let response = transport.send(request).await.map_err(|e| {
        warn!(url = %request.url, error = %e, "transport failed");
        FetchError::from(e)
    })?;

    let result = classify(response.status, &response.body);
    match &result {
        Ok(_) => debug!(url = %request.url, status = response.status, "decoded response"),
        Err(e) => warn!(url = %request.url, kind = e.kind(), error = %e, "request failed"),
    }
    result
}
