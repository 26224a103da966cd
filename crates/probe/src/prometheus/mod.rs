//! Client for the Prometheus alerts API.

mod client;

pub use client::{Alert, AlertState, AlertsApi, PrometheusClient};

#[cfg(test)]
pub use client::MockAlertsApi;
