//! HTTP transport types shared by every `Transport` implementation.
//!
//! # Design
//! Requests and responses are plain data. A `Transport` turns an
//! `HttpRequest` into an `HttpResponse` and nothing else; status
//! interpretation lives in the pipeline so the mock and live transports look
//! identical from above.
//!
//! The response body is kept as raw bytes. Decoding happens once, in
//! `pipeline::classify`.

/// HTTP method for a request. Only reads are issued by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
///
/// The `url` is the request identity: the mock transport dispatches on it by
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Raw transport output: status code, headers and body bytes.
///
/// A 4xx or 5xx status is still a successful transport result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// True for any status in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
