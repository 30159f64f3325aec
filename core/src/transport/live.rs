use async_trait::async_trait;
use tracing::debug;

use super::Transport;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Transport backed by a real HTTP client.
///
/// ureq is blocking, so each round-trip runs on tokio's blocking pool and the
/// caller's task only awaits the join. HTTP-status-as-error is disabled:
/// 4xx/5xx come back as data, exactly like the mock.
#[derive(Clone)]
pub struct LiveTransport {
    agent: ureq::Agent,
}

impl LiveTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for LiveTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for LiveTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || execute(&agent, &request))
            .await
            .map_err(|e| TransportError::Worker(e.to_string()))?
    }
}

/// One blocking round-trip. Status and body are returned verbatim.
fn execute(agent: &ureq::Agent, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut builder = match request.method {
        HttpMethod::Get => agent.get(request.url.as_str()),
    };
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let mut response = builder
        .call()
        .map_err(|e| TransportError::Connect(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_vec()
        .map_err(|e| TransportError::Connect(e.to_string()))?;

    debug!(
        method = request.method.as_str(),
        url = %request.url,
        status,
        bytes = body.len(),
        "live transport round-trip complete"
    );
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
