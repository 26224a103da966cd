use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Runtime configuration, resolved from the environment once at startup and
/// passed around by reference afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Prometheus server whose alerts gate readiness.
    pub prometheus_endpoint: Url,

    /// Deadline for a single alerts query. An unresponsive backend fails the
    /// readiness check after this long.
    pub prometheus_api_timeout: Duration,

    /// An active alert blocks readiness when its `severity` label value is a
    /// member of this set.
    pub prometheus_alert_severities: Vec<String>,

    /// Single-alert mode: watch exactly the alert with this `alertname`
    /// instead of filtering by severity.
    pub prometheus_alert_name: Option<String>,

    /// Bearer token attached to every Prometheus request.
    pub prometheus_bearer_token: Option<String>,

    /// Path serving the liveness probe.
    pub liveness_path: String,

    /// Path serving the readiness probe.
    pub readiness_path: String,

    /// Port the probe endpoints listen on.
    pub listen_port: u16,
}

impl Config {
    /// Read configuration from the process environment, applying defaults.
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let endpoint_raw = lookup("PROMETHEUS_ENDPOINT")
            .unwrap_or_else(|| "http://localhost:9090".to_string());
        let prometheus_endpoint = Url::parse(&endpoint_raw).map_err(|e| {
            Error::Config(format!("PROMETHEUS_ENDPOINT is not a valid URL: {}", e))
        })?;

        let timeout_raw =
            lookup("PROMETHEUS_API_TIMEOUT").unwrap_or_else(|| "10".to_string());
        let timeout_secs: u64 = timeout_raw.parse().map_err(|e| {
            Error::Config(format!(
                "Cannot convert PROMETHEUS_API_TIMEOUT into an int: {}",
                e
            ))
        })?;
        if timeout_secs == 0 {
            return Err(Error::Config(
                "PROMETHEUS_API_TIMEOUT must be greater than zero".to_string(),
            ));
        }

        // Membership is tested with exact string comparison, so the values are
        // kept verbatim: no trimming, no case folding.
        let severities_csv = lookup("PROMETHEUS_ALERT_SEVERITIES")
            .unwrap_or_else(|| "critical,warning".to_string());
        let prometheus_alert_severities: Vec<String> =
            severities_csv.split(',').map(str::to_string).collect();

        let prometheus_alert_name = match lookup("PROMETHEUS_ALERT_NAME") {
            Some(name) if name.is_empty() => {
                return Err(Error::Config(
                    "PROMETHEUS_ALERT_NAME must not be empty when set".to_string(),
                ))
            }
            other => other,
        };

        let prometheus_bearer_token = lookup("PROMETHEUS_BEARER_TOKEN");

        let liveness_path =
            lookup("KUBE_LIVENESS_PATH").unwrap_or_else(|| "/live".to_string());
        let readiness_path =
            lookup("KUBE_READINESS_PATH").unwrap_or_else(|| "/ready".to_string());
        for (key, path) in [
            ("KUBE_LIVENESS_PATH", &liveness_path),
            ("KUBE_READINESS_PATH", &readiness_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::Config(format!(
                    "{} must be an absolute path starting with '/'",
                    key
                )));
            }
        }

        let port_raw =
            lookup("KUBE_PROBE_LISTEN_PORT").unwrap_or_else(|| "8080".to_string());
        let listen_port: u16 = port_raw.parse().map_err(|e| {
            Error::Config(format!(
                "Cannot convert KUBE_PROBE_LISTEN_PORT into a port number: {}",
                e
            ))
        })?;

        Ok(Config {
            prometheus_endpoint,
            prometheus_api_timeout: Duration::from_secs(timeout_secs),
            prometheus_alert_severities,
            prometheus_alert_name,
            prometheus_bearer_token,
            liveness_path,
            readiness_path,
            listen_port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        Config::from_source(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = load_from(&[]).unwrap();

        assert_eq!(config.prometheus_endpoint.as_str(), "http://localhost:9090/");
        assert_eq!(config.prometheus_api_timeout, Duration::from_secs(10));
        assert_eq!(
            config.prometheus_alert_severities,
            vec!["critical".to_string(), "warning".to_string()]
        );
        assert_eq!(config.prometheus_alert_name, None);
        assert_eq!(config.prometheus_bearer_token, None);
        assert_eq!(config.liveness_path, "/live");
        assert_eq!(config.readiness_path, "/ready");
        assert_eq!(config.listen_port, 8080);
    }

    #[test]
    fn reads_overrides_from_environment() {
        let config = load_from(&[
            ("PROMETHEUS_ENDPOINT", "https://prometheus.example.com:9091"),
            ("PROMETHEUS_API_TIMEOUT", "3"),
            ("PROMETHEUS_ALERT_SEVERITIES", "critical"),
            ("PROMETHEUS_BEARER_TOKEN", "s3cret"),
            ("KUBE_LIVENESS_PATH", "/healthz"),
            ("KUBE_READINESS_PATH", "/readyz"),
            ("KUBE_PROBE_LISTEN_PORT", "9000"),
        ])
        .unwrap();

        assert_eq!(
            config.prometheus_endpoint.as_str(),
            "https://prometheus.example.com:9091/"
        );
        assert_eq!(config.prometheus_api_timeout, Duration::from_secs(3));
        assert_eq!(config.prometheus_alert_severities, vec!["critical".to_string()]);
        assert_eq!(config.prometheus_bearer_token.as_deref(), Some("s3cret"));
        assert_eq!(config.liveness_path, "/healthz");
        assert_eq!(config.readiness_path, "/readyz");
        assert_eq!(config.listen_port, 9000);
    }

    #[test]
    fn severities_are_split_on_commas_verbatim() {
        let config =
            load_from(&[("PROMETHEUS_ALERT_SEVERITIES", "critical, warning,Page")]).unwrap();

        // No trimming or normalization of the configured values.
        assert_eq!(
            config.prometheus_alert_severities,
            vec![
                "critical".to_string(),
                " warning".to_string(),
                "Page".to_string()
            ]
        );
    }

    #[test]
    fn accepts_alert_name_for_single_alert_mode() {
        let config = load_from(&[("PROMETHEUS_ALERT_NAME", "Watchdog")]).unwrap();
        assert_eq!(config.prometheus_alert_name.as_deref(), Some("Watchdog"));
    }

    #[test]
    fn rejects_empty_alert_name() {
        let err = load_from(&[("PROMETHEUS_ALERT_NAME", "")]).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("PROMETHEUS_ALERT_NAME")));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = load_from(&[("PROMETHEUS_API_TIMEOUT", "soon")]).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("PROMETHEUS_API_TIMEOUT")));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = load_from(&[("PROMETHEUS_API_TIMEOUT", "0")]).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("greater than zero")));
    }

    #[test]
    fn rejects_invalid_endpoint_url() {
        let err = load_from(&[("PROMETHEUS_ENDPOINT", "not a url")]).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("PROMETHEUS_ENDPOINT")));
    }

    #[test]
    fn rejects_relative_probe_paths() {
        let err = load_from(&[("KUBE_READINESS_PATH", "ready")]).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("KUBE_READINESS_PATH")));
    }

    #[test]
    fn rejects_out_of_range_port() {
        let err = load_from(&[("KUBE_PROBE_LISTEN_PORT", "70000")]).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("KUBE_PROBE_LISTEN_PORT")));
    }
}
