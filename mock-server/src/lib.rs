//! HTTP server answering with the same fixture table as `MockTransport`.
//!
//! Used to drive the live transport end-to-end over a real socket.

use axum::{http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Named {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/people", get(people))
        .route("/planets", get(planets))
        .route("/starships", get(starships))
        .fallback(invalid_request)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn named(name: &str) -> Json<Named> {
    Json(Named {
        name: name.to_string(),
    })
}

async fn people() -> Json<Named> {
    named("James Bond")
}

async fn planets() -> Json<Named> {
    named("Yavin IV")
}

async fn starships() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})))
}

async fn invalid_request(uri: axum::http::Uri) -> (StatusCode, Json<ErrorBody>) {
    debug!(%uri, "no fixture for path");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            errors: vec!["invalid_request".to_string()],
        }),
    )
}
