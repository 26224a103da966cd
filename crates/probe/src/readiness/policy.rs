use std::sync::Arc;
use tracing::error;

use super::ReadinessResult;
use crate::config::Config;
use crate::prometheus::Alert;

/// Decides which active alerts a given probe configuration cares about.
pub trait AlertPolicy: Send + Sync {
    /// Whether this alert counts towards the readiness decision at all.
    fn is_relevant(&self, alert: &Alert) -> bool;

    /// Outcome once the scan finished without hitting a relevant firing
    /// alert. `saw_relevant` reports whether any relevant alert appeared.
    fn on_scan_complete(&self, saw_relevant: bool) -> ReadinessResult;
}

/// Build the policy selected by the configuration: single-alert mode when an
/// alert name is configured, severity filtering otherwise.
pub fn policy_from_config(config: &Config) -> Arc<dyn AlertPolicy> {
    match &config.prometheus_alert_name {
        Some(name) => Arc::new(NamedAlertPolicy::new(name.clone())),
        None => Arc::new(SeverityPolicy::new(
            config.prometheus_alert_severities.clone(),
        )),
    }
}

/// Blocks readiness on any firing alert whose `severity` label value is a
/// member of the configured set. Matching is exact and case-sensitive; an
/// alert without a `severity` label is never relevant.
pub struct SeverityPolicy {
    severities: Vec<String>,
}

impl SeverityPolicy {
    pub fn new(severities: Vec<String>) -> Self {
        Self { severities }
    }
}

impl AlertPolicy for SeverityPolicy {
    fn is_relevant(&self, alert: &Alert) -> bool {
        match alert.severity() {
            Some(severity) => self.severities.iter().any(|s| s == severity),
            None => false,
        }
    }

    fn on_scan_complete(&self, _saw_relevant: bool) -> ReadinessResult {
        ReadinessResult::Ready
    }
}

/// Single-alert mode: watches exactly one alert by its `alertname` label.
pub struct NamedAlertPolicy {
    alert_name: String,
}

impl NamedAlertPolicy {
    pub fn new(alert_name: String) -> Self {
        Self { alert_name }
    }
}

impl AlertPolicy for NamedAlertPolicy {
    fn is_relevant(&self, alert: &Alert) -> bool {
        alert.name() == Some(self.alert_name.as_str())
    }

    fn on_scan_complete(&self, saw_relevant: bool) -> ReadinessResult {
        if saw_relevant {
            return ReadinessResult::Ready;
        }

        // The watched alert is missing from the active set entirely, which
        // points at a misconfigured alert name or a backend that no longer
        // evaluates the rule.
        let msg = format!(
            "watched alert {:?} is not present in the active alert set; check PROMETHEUS_ALERT_NAME",
            self.alert_name
        );
        error!("{}", msg);
        ReadinessResult::NotReady(msg)
    }
}
