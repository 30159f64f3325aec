use fetch_core::{FetchConfig, FetchManager, LatencyConfig, Outcome, Resource};
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let no_color = std::env::var("NO_COLOR").is_ok()
        || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(!no_color)
        .init();

    let config = FetchConfig::default();
    let latency = LatencyConfig::default();
    info!(base_url = %config.base_url, ?latency, "fetch-demo starting on mock transport");

    let manager = FetchManager::mock(config, latency.build());

    // Observers fire in completion order, which the random delay shuffles.
    let handles: Vec<_> = Resource::ALL
        .into_iter()
        .map(|resource| {
            let handle = manager.fetch_resource(resource);
            handle.subscribe(move |outcome| match outcome {
                Outcome::Value(response) => info!(%resource, name = %response.name, "received"),
                Outcome::Recovered { value, cause } => {
                    info!(%resource, name = %value.name, %cause, "received fallback")
                }
                Outcome::Failed(err) => warn!(%resource, kind = err.kind(), %err, "failed"),
            });
            handle
        })
        .collect();

    for handle in handles {
        handle.wait().await;
    }
    info!("all fetches finished");
}
