//! The readiness decision: query active alerts, filter by policy, map the
//! outcome to ready/not-ready.

mod policy;

pub use policy::{policy_from_config, AlertPolicy, NamedAlertPolicy, SeverityPolicy};

use std::sync::Arc;
use tracing::error;

use crate::prometheus::{AlertState, AlertsApi};

/// Outcome of a single readiness evaluation. Produced fresh per request,
/// never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessResult {
    Ready,
    NotReady(String),
}

/// Evaluates readiness against the current state of the alerting backend.
///
/// Holds no mutable state; evaluations are independent, and repeated calls
/// against an unchanged backend yield the same result.
pub struct ReadinessEvaluator {
    api: Arc<dyn AlertsApi>,
    policy: Arc<dyn AlertPolicy>,
}

impl ReadinessEvaluator {
    pub fn new(api: Arc<dyn AlertsApi>, policy: Arc<dyn AlertPolicy>) -> Self {
        Self { api, policy }
    }

    /// Run one readiness check: a single bounded query to the backend, then a
    /// scan of the returned alerts. A failed query is not retried; the next
    /// probe from the orchestrator is the retry.
    pub async fn evaluate(&self) -> ReadinessResult {
        // The alerts endpoint only returns active alerts, not all alerts.
        // Inactive alerts are of no interest here anyway.
        let alerts = match self.api.active_alerts().await {
            Ok(alerts) => alerts,
            Err(e) => return ReadinessResult::NotReady(e.to_string()),
        };

        let mut saw_relevant = false;
        for alert in &alerts {
            if !self.policy.is_relevant(alert) {
                continue;
            }
            saw_relevant = true;

            // Pending alerts do not block; only an alert that is already
            // firing fails the probe. First hit wins, in backend order.
            if alert.state == AlertState::Firing {
                let msg = format!("The Prometheus alert is firing: {:?}", alert.labels);
                error!("{}", msg);
                return ReadinessResult::NotReady(msg);
            }
        }

        self.policy.on_scan_complete(saw_relevant)
    }
}
