//! Per-resource fetch operations over one shared transport.
//!
//! # Design
//! `FetchManager` holds an `Arc<dyn Transport>` and never a concrete type, so
//! swapping mock for live touches nothing below. Each `fetch_*` call builds a
//! fixed `HttpRequest`, spawns the pipeline on its own task and hands back a
//! `FetchHandle`. Calls are independent: no ordering between them is implied.
//!
//! The starships call site recovers locally: any error becomes the configured
//! fallback `Response`. Every other call site propagates errors unchanged.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::handle::{FetchHandle, Outcome};
use crate::http::HttpRequest;
use crate::pipeline;
use crate::transport::{Latency, LiveTransport, MockTransport, TransportPtr};
use crate::types::{Resource, Response};

/// What a call site does with a terminal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery<T> {
    Propagate,
    /// Replace any error with this value.
    Fallback(T),
}

impl<T> Recovery<T> {
    pub fn apply(self, result: Result<T, FetchError>) -> Outcome<T> {
        match (result, self) {
            (Ok(value), _) => Outcome::Value(value),
            (Err(cause), Recovery::Fallback(value)) => Outcome::Recovered { value, cause },
            (Err(err), Recovery::Propagate) => Outcome::Failed(err),
        }
    }
}

/// Issues fetches for the named resources through one transport.
#[derive(Clone)]
pub struct FetchManager {
    transport: TransportPtr,
    config: FetchConfig,
}

impl FetchManager {
    pub fn new(transport: TransportPtr, config: FetchConfig) -> Self {
        let config = FetchConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };
        Self { transport, config }
    }

    /// Manager over the fixture table rooted at `config.base_url`.
    pub fn mock(config: FetchConfig, latency: impl Latency + 'static) -> Self {
        let transport = MockTransport::fixtures(&config.base_url, latency);
        Self::new(Arc::new(transport), config)
    }

    pub fn live(config: FetchConfig) -> Self {
        Self::new(Arc::new(LiveTransport::new()), config)
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn build_request(&self, resource: Resource) -> HttpRequest {
        HttpRequest::get(format!("{}/{}", self.config.base_url, resource.path()))
            .with_header("accept", "application/json")
    }

    pub fn fetch_people(&self) -> FetchHandle<Response> {
        self.fetch(self.build_request(Resource::People), Recovery::Propagate)
    }

    pub fn fetch_planets(&self) -> FetchHandle<Response> {
        self.fetch(self.build_request(Resource::Planets), Recovery::Propagate)
    }

    /// Never fails: errors are replaced by `config.starship_fallback`.
    pub fn fetch_starships(&self) -> FetchHandle<Response> {
        let fallback = Response::new(self.config.starship_fallback.clone());
        self.fetch(
            self.build_request(Resource::Starships),
            Recovery::Fallback(fallback),
        )
    }

    pub fn fetch_penguins(&self) -> FetchHandle<Response> {
        self.fetch(self.build_request(Resource::Penguins), Recovery::Propagate)
    }

    /// Dispatch to the matching `fetch_*` operation.
    pub fn fetch_resource(&self, resource: Resource) -> FetchHandle<Response> {
        match resource {
            Resource::People => self.fetch_people(),
            Resource::Planets => self.fetch_planets(),
            Resource::Starships => self.fetch_starships(),
            Resource::Penguins => self.fetch_penguins(),
        }
    }

    /// Fetch `request` as `T` on a new task. Must be called within a tokio
    /// runtime.
    pub fn fetch<T>(&self, request: HttpRequest, recovery: Recovery<T>) -> FetchHandle<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let transport = Arc::clone(&self.transport);
        FetchHandle::spawn(async move {
            let result = pipeline::fetch::<T>(transport.as_ref(), &request).await;
            let outcome = recovery.apply(result);
            if let Outcome::Recovered { cause, .. } = &outcome {
                warn!(url = %request.url, error = %cause, "substituted fallback value");
            }
            outcome
        })
    }
}
