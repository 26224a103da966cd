mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{config::Config, readiness::ReadinessEvaluator, Result};

/// HTTP surface of the probe: the liveness and readiness paths from the
/// configuration, nothing else.
pub struct Server {
    liveness_path: String,
    readiness_path: String,
    listen_port: u16,
    evaluator: Arc<ReadinessEvaluator>,
}

impl Server {
    pub fn new(config: &Config, evaluator: Arc<ReadinessEvaluator>) -> Self {
        Self {
            liveness_path: config.liveness_path.clone(),
            readiness_path: config.readiness_path.clone(),
            listen_port: config.listen_port,
            evaluator,
        }
    }

    pub fn build_router(&self) -> Router {
        Router::new()
            .route(&self.liveness_path, get(routes::live))
            .route(&self.readiness_path, get(routes::ready))
            .layer(TraceLayer::new_for_http())
            .with_state(self.evaluator.clone())
    }

    /// Bind the listen port and serve until SIGTERM/SIGINT.
    pub async fn start(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.listen_port);
        let listener = TcpListener::bind(&addr).await?;
        info!("Starting HTTP listener on {}", addr);

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
