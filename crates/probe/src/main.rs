use std::sync::Arc;
use tracing::info;

use prometheus_readiness_probe::{
    config::Config,
    prometheus::PrometheusClient,
    readiness::{policy_from_config, ReadinessEvaluator},
    server::Server,
    Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration; a bad environment is fatal before we serve traffic.
    let config = Config::load()?;
    info!(
        endpoint = %config.prometheus_endpoint,
        timeout = ?config.prometheus_api_timeout,
        liveness_path = %config.liveness_path,
        readiness_path = %config.readiness_path,
        "Loaded configuration"
    );

    // Initialize the Prometheus client
    let client = PrometheusClient::new(config.prometheus_endpoint.clone())
        .with_timeout(config.prometheus_api_timeout)
        .with_bearer_token(config.prometheus_bearer_token.clone());

    let policy = policy_from_config(&config);
    let evaluator = Arc::new(ReadinessEvaluator::new(Arc::new(client), policy));

    // Start server
    let server = Server::new(&config, evaluator);
    server.start().await
}
