//! Fetch manager behaviour over the mock transport.
//!
//! Runs on tokio's paused clock, so the injected latency advances instantly
//! and deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fetch_core::{
    Completion, ErrorCode, FetchConfig, FetchError, FetchManager, FixedLatency, HttpRequest,
    HttpResponse, LatencyConfig, MockTransport, Outcome, Phase, Resource, Response, Transport,
    TransportError,
};
use tokio::time::Instant;

const BASE: &str = "http://mock.local/api";

fn config() -> FetchConfig {
    FetchConfig::with_base_url(BASE)
}

fn instant_manager() -> FetchManager {
    FetchManager::mock(config(), FixedLatency::default())
}

fn kind(outcome: &Outcome<Response>) -> &'static str {
    match outcome {
        Outcome::Value(_) => "Value",
        Outcome::Recovered { .. } => "Recovered",
        Outcome::Failed(err) => err.kind(),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn people_decodes_james_bond() {
    let outcome = instant_manager().fetch_people().wait().await.unwrap();
    assert_eq!(outcome.completion(), Completion::Finished);
    assert!(matches!(outcome, Outcome::Value(ref r) if r.name == "James Bond"));
}

#[tokio::test]
async fn planets_decodes_yavin() {
    let outcome = instant_manager().fetch_planets().wait().await.unwrap();
    assert_eq!(outcome.into_result().unwrap(), Response::new("Yavin IV"));
}

#[tokio::test]
async fn starships_malformed_error_is_replaced_by_fallback() {
    let outcome = instant_manager().fetch_starships().wait().await.unwrap();
    assert_eq!(outcome.completion(), Completion::Finished);
    match outcome {
        Outcome::Recovered { value, cause } => {
            assert_eq!(value.name, "Millennium Falcon");
            match cause {
                FetchError::MalformedErrorBody { status, body, .. } => {
                    assert_eq!(status, 401);
                    assert_eq!(body, "{}");
                }
                other => panic!("expected MalformedErrorBody, got {other:?}"),
            }
        }
        other => panic!("expected Recovered, got {other:?}"),
    }
}

#[tokio::test]
async fn starships_fallback_name_is_configurable() {
    let config = FetchConfig {
        starship_fallback: "Slave I".to_string(),
        ..config()
    };
    let manager = FetchManager::mock(config, FixedLatency::default());
    let outcome = manager.fetch_starships().wait().await.unwrap();
    assert_eq!(outcome.value(), Some(&Response::new("Slave I")));
}

#[tokio::test]
async fn penguins_is_a_service_error() {
    let outcome = instant_manager().fetch_penguins().wait().await.unwrap();
    assert_eq!(outcome.completion(), Completion::Failure);
    match outcome {
        Outcome::Failed(FetchError::Service { status, error }) => {
            assert_eq!(status, 500);
            assert_eq!(error.errors, vec![ErrorCode::InvalidRequest]);
        }
        other => panic!("expected Service error, got {other:?}"),
    }
}

#[tokio::test]
async fn other_call_sites_propagate_errors() {
    // Same 401 `{}` as starships, but on a call site without a fallback.
    let transport = MockTransport::fixtures(BASE, FixedLatency::default()).with_route(
        format!("{BASE}/people"),
        fetch_core::CannedResponse::new(401, "{}"),
    );
    let manager = FetchManager::new(Arc::new(transport), config());
    let outcome = manager.fetch_people().wait().await.unwrap();
    assert!(matches!(
        outcome,
        Outcome::Failed(FetchError::MalformedErrorBody { status: 401, .. })
    ));
}

#[tokio::test]
async fn generic_fetch_decodes_other_types() {
    #[derive(Debug, serde::Deserialize)]
    struct Loose {
        #[allow(dead_code)]
        name: serde_json::Value,
    }

    let manager = instant_manager();
    let request = manager.build_request(Resource::Planets);
    let outcome = manager
        .fetch::<Loose>(request, fetch_core::Recovery::Propagate)
        .wait()
        .await
        .unwrap();
    assert!(outcome.is_success());
}

// ---------------------------------------------------------------------------
// Idempotence and ordering
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn repeated_fetches_have_same_outcome_shape() {
    let manager = FetchManager::mock(config(), LatencyConfig::default().seeded(11).build());

    for resource in Resource::ALL {
        let first = manager.fetch_resource(resource).wait().await.unwrap();
        let second = manager.fetch_resource(resource).wait().await.unwrap();
        assert_eq!(kind(&first), kind(&second), "{resource}");
        assert_eq!(
            first.value().map(|r| r.name.clone()),
            second.value().map(|r| r.name.clone()),
            "{resource}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_overlap() {
    let latency = LatencyConfig::default().seeded(3);
    let manager = FetchManager::mock(config(), latency.build());
    let start = Instant::now();

    let handles: Vec<_> = (0..8)
        .map(|i| manager.fetch_resource(Resource::ALL[i % 4]))
        .collect();
    for handle in handles {
        assert!(handle.wait().await.is_some());
    }

    // Eight serial calls would take at least eight units.
    let elapsed = start.elapsed();
    assert!(elapsed >= latency.unit * latency.min_units, "{elapsed:?}");
    assert!(elapsed <= latency.unit * latency.max_units, "{elapsed:?}");
}

/// Delays each URL by a fixed amount, to force a known completion order.
struct DelayByUrl {
    inner: MockTransport,
    delays: HashMap<String, Duration>,
}

#[async_trait]
impl Transport for DelayByUrl {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Some(delay) = self.delays.get(&request.url) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.send(request).await
    }
}

#[tokio::test(start_paused = true)]
async fn completion_order_follows_latency_not_issue_order() {
    let delays = [
        (Resource::People, 4),
        (Resource::Planets, 1),
        (Resource::Starships, 3),
        (Resource::Penguins, 2),
    ]
    .into_iter()
    .map(|(r, secs)| (format!("{BASE}/{}", r.path()), Duration::from_secs(secs)))
    .collect();
    let transport = DelayByUrl {
        inner: MockTransport::fixtures(BASE, FixedLatency::default()),
        delays,
    };
    let manager = FetchManager::new(Arc::new(transport), config());

    let order = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = Resource::ALL
        .into_iter()
        .map(|resource| {
            let handle = manager.fetch_resource(resource);
            let order = Arc::clone(&order);
            handle.subscribe(move |_| order.lock().unwrap().push(resource));
            handle
        })
        .collect();
    for handle in handles {
        handle.wait().await;
    }

    assert_eq!(
        *order.lock().unwrap(),
        vec![
            Resource::Planets,
            Resource::Penguins,
            Resource::Starships,
            Resource::People
        ]
    );
}

struct Panicking;

#[async_trait]
impl Transport for Panicking {
    async fn send(&self, _: &HttpRequest) -> Result<HttpResponse, TransportError> {
        panic!("transport bug")
    }
}

#[tokio::test]
async fn panicking_transport_still_yields_terminal_outcome() {
    let manager = FetchManager::new(Arc::new(Panicking), config());

    let people = tokio::time::timeout(Duration::from_secs(5), manager.fetch_people().wait())
        .await
        .expect("people fetch resolves")
        .unwrap();
    assert!(matches!(
        people,
        Outcome::Failed(FetchError::Transport(TransportError::Worker(_)))
    ));

    // The fallback policy runs inside the worker, so a panic skips it.
    let starships =
        tokio::time::timeout(Duration::from_secs(5), manager.fetch_starships().wait())
            .await
            .expect("starships fetch resolves")
            .unwrap();
    assert_eq!(starships.completion(), Completion::Failure);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancel_before_delivery_notifies_nobody() {
    let manager = FetchManager::mock(config(), FixedLatency(Duration::from_secs(2)));
    let count = Arc::new(AtomicUsize::new(0));

    let handle = manager.fetch_people();
    let c = Arc::clone(&count);
    handle.subscribe(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(handle.phase(), Phase::Pending);
    assert!(handle.cancel());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.phase(), Phase::Cancelled);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(handle.wait().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn cancelling_one_fetch_leaves_others_alone() {
    let manager = FetchManager::mock(config(), FixedLatency(Duration::from_secs(1)));
    let delivered = Arc::new(Mutex::new(Vec::new()));

    let people = manager.fetch_people();
    let planets = manager.fetch_planets();
    for (label, handle) in [("people", &people), ("planets", &planets)] {
        let delivered = Arc::clone(&delivered);
        handle.subscribe(move |_| delivered.lock().unwrap().push(label));
    }
    assert!(people.cancel());

    let outcome = planets.wait().await.unwrap();
    assert_eq!(outcome.value(), Some(&Response::new("Yavin IV")));
    assert_eq!(*delivered.lock().unwrap(), vec!["planets"]);
}

#[tokio::test(start_paused = true)]
async fn dropped_handle_is_never_delivered() {
    let manager = FetchManager::mock(config(), FixedLatency(Duration::from_secs(1)));
    let count = Arc::new(AtomicUsize::new(0));

    {
        let handle = manager.fetch_penguins();
        let c = Arc::clone(&count);
        handle.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
    }

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_after_completion_is_ignored() {
    let manager = FetchManager::mock(config(), FixedLatency(Duration::from_secs(1)));
    let handle = manager.fetch_people();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(handle.phase(), Phase::Completed);
    assert!(!handle.cancel());
    assert_eq!(
        handle.wait().await.unwrap().into_result().unwrap(),
        Response::new("James Bond")
    );
}
