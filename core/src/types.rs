//! Domain DTOs decoded from response bodies.
//!
//! # Design
//! `ServiceError` is the structured payload the origin service returns on a
//! non-2xx status. Error codes outside the known set decode to
//! `ErrorCode::Unrecognized` instead of failing the whole body, so a service
//! that adds a new code does not turn a typed `Service` error into a
//! `MalformedErrorBody`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The success payload shared by every resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
    pub name: String,
}

impl Response {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Structured error body: an ordered list of error codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceError {
    pub errors: Vec<ErrorCode>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no error codes");
        }
        for (i, code) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", code.as_str())?;
        }
        Ok(())
    }
}

/// A single service error code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    InvalidRequest,

    /// Any code this client does not know about, kept verbatim.
    Unrecognized(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::Unrecognized(code) => code,
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "invalid_request" => ErrorCode::InvalidRequest,
            _ => ErrorCode::Unrecognized(code),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidRequest => "invalid_request".to_string(),
            ErrorCode::Unrecognized(code) => code,
        }
    }
}

/// The named resources the fetch manager knows how to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    People,
    Planets,
    Starships,
    Penguins,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::People,
        Resource::Planets,
        Resource::Starships,
        Resource::Penguins,
    ];

    /// Path segment appended to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Resource::People => "people",
            Resource::Planets => "planets",
            Resource::Starships => "starships",
            Resource::Penguins => "penguins",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
