use serde::{Deserialize, Serialize};
use std::time::{Duration, TryFromFloatSecsError};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base API URL including the "/api" and version path, e.g. `https://elis.rossum.ai/api/v1`
    pub base_url: String,

    /// Whole-request timeout in seconds (no timeout when unset)
    #[serde(default)]
    pub timeout_secs: Option<f64>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of exchanges outstanding at the same time per client
    #[serde(default = "default_max_in_flight_requests")]
    pub max_in_flight_requests: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_in_flight_requests() -> usize {
    4
}

fn default_user_agent() -> String {
    concat!("rossum-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (3 retries = 4 attempts)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry when the server gives no hint
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Multiplies the exponential delay
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Upper bound of the uniform random jitter added to every delay
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,

    /// Total time budget for one logical call, retries included
    #[serde(default = "default_max_total_wait_secs")]
    pub max_total_wait_secs: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_backoff_factor() -> f64 {
    1.0
}

fn default_max_jitter_ms() -> u64 {
    1000
}

fn default_max_total_wait_secs() -> u64 {
    60
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            backoff_factor: default_backoff_factor(),
            max_jitter_ms: default_max_jitter_ms(),
            max_total_wait_secs: default_max_total_wait_secs(),
        }
    }
}

impl RetryConfig {
    /// No retries at all; every error surfaces on first occurrence
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_jitter(&self) -> Duration {
        Duration::from_millis(self.max_jitter_ms)
    }

    pub fn max_total_wait(&self) -> Duration {
        Duration::from_secs(self.max_total_wait_secs)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            max_in_flight_requests: default_max_in_flight_requests(),
            user_agent: default_user_agent(),
            retry: RetryConfig::default(),
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs_f64());
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_in_flight_requests(mut self, limit: usize) -> Self {
        self.max_in_flight_requests = limit;
        self
    }

    /// Whole-request timeout; negative, NaN or infinite seconds are rejected
    pub fn timeout(&self) -> Result<Option<Duration>, TryFromFloatSecsError> {
        self.timeout_secs.map(Duration::try_from_secs_f64).transpose()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Base URL normalized with a trailing slash so relative paths join below it
    pub fn normalized_base_url(&self) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        format!("{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "https://elis.rossum.ai/api/v1"}"#).unwrap();

        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.max_in_flight_requests, 4);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay(), Duration::from_secs(1));
        assert_eq!(config.retry.max_total_wait(), Duration::from_secs(60));
        assert!(config.user_agent.starts_with("rossum-rs/"));
    }

    #[test]
    fn test_partial_retry_section() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"base_url": "http://localhost", "retry": {"max_retries": 1, "max_jitter_ms": 0}}"#,
        )
        .unwrap();

        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.max_jitter(), Duration::ZERO);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }

    #[test]
    fn test_timeout_conversion() {
        let config = ClientConfig::new("http://localhost").with_timeout(Duration::from_millis(2500));
        assert_eq!(config.timeout().unwrap(), Some(Duration::from_millis(2500)));

        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost", "timeout_secs": -1}"#).unwrap();
        assert!(config.timeout().is_err());

        for bad in [f64::NAN, f64::INFINITY] {
            let config = ClientConfig {
                timeout_secs: Some(bad),
                ..ClientConfig::new("http://localhost")
            };
            assert!(config.timeout().is_err());
        }
    }

    #[test]
    fn test_normalized_base_url() {
        assert_eq!(
            ClientConfig::new("https://elis.rossum.ai/api/v1").normalized_base_url(),
            "https://elis.rossum.ai/api/v1/"
        );
        assert_eq!(
            ClientConfig::new("https://elis.rossum.ai/api/v1//").normalized_base_url(),
            "https://elis.rossum.ai/api/v1/"
        );
    }
}
