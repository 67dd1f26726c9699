//! Client configuration.
//!
//! # Environment Variables
//!
//! | Setting | Primary Env Var | Fallback Env Var | Default |
//! |---------|-----------------|------------------|---------|
//! | Server URL | `SEQCONV_SERVER_URL` | `SNAPGENE_WEB_URL` | `http://localhost:8080` |
//! | Customer id | `SEQCONV_CUSTOMER_ID` | - | `UNDEFINED_CUSTOMER` |
//! | Connect timeout (ms) | `SEQCONV_CONNECT_TIMEOUT_MS` | - | `2000` |
//! | Work directory | `SEQCONV_WORK_DIR` | - | OS temp dir |
//! | Retry delay (ms) | `SEQCONV_RETRY_DELAY_MS` | - | `1000` |
//! | Max attempts | `SEQCONV_MAX_ATTEMPTS` | - | `3` |
//! | Sliding window | `SEQCONV_SLIDING_WINDOW` | - | `50` |
//! | Failure rate (%) | `SEQCONV_FAILURE_RATE` | - | `50` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;
use crate::resilience::ResiliencePolicy;
use crate::retry::Backoff;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const UNDEFINED_CUSTOMER: &str = "UNDEFINED_CUSTOMER";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Everything needed to build a [`crate::ConversionClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub customer_id: String,
    pub connect_timeout: Duration,
    /// Where intermediate native files are written.
    pub work_dir: PathBuf,
    pub policy: ResiliencePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_SERVER_URL).expect("default server url is valid"),
            customer_id: String::from(UNDEFINED_CUSTOMER),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            work_dir: env::temp_dir(),
            policy: ResiliencePolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url(base_url)?,
            ..Self::default()
        })
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any name → value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SEQCONV_SERVER_URL").or_else(|| lookup("SNAPGENE_WEB_URL")) {
            config.base_url = parse_url(&url)?;
        }
        if let Some(customer_id) = lookup("SEQCONV_CUSTOMER_ID") {
            config = config.with_customer_id(customer_id)?;
        }
        if let Some(ms) = number(&lookup, "SEQCONV_CONNECT_TIMEOUT_MS")? {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(dir) = lookup("SEQCONV_WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }
        if let Some(ms) = number(&lookup, "SEQCONV_RETRY_DELAY_MS")? {
            config.policy.backoff = Backoff::Fixed {
                delay: Duration::from_millis(ms),
            };
        }
        if let Some(attempts) = number(&lookup, "SEQCONV_MAX_ATTEMPTS")? {
            config.policy.max_attempts = in_range("SEQCONV_MAX_ATTEMPTS", attempts, 1, 20)? as u32;
        }
        if let Some(window) = number(&lookup, "SEQCONV_SLIDING_WINDOW")? {
            config.policy.sliding_window_size =
                in_range("SEQCONV_SLIDING_WINDOW", window, 1, 10_000)? as usize;
        }
        if let Some(rate) = number(&lookup, "SEQCONV_FAILURE_RATE")? {
            config.policy.failure_rate_threshold =
                in_range("SEQCONV_FAILURE_RATE", rate, 1, 100)? as f32;
        }

        Ok(config)
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Result<Self, ConfigError> {
        let customer_id = customer_id.into();
        if customer_id.trim().is_empty() {
            return Err(ConfigError::EmptyCustomerId);
        }
        self.customer_id = customer_id;
        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_url(base_url)?;
        Ok(self)
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_policy(mut self, policy: ResiliencePolicy) -> Self {
        self.policy = policy;
        self
    }
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|error| ConfigError::InvalidUrl {
        value: value.to_owned(),
        reason: error.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            value: value.to_owned(),
            reason: String::from("scheme must be http or https"),
        });
    }
    Ok(url)
}

fn number<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let parsed = raw.trim().parse::<u64>();
    match parsed {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(ConfigError::InvalidNumber { name, value: raw }),
    }
}

fn in_range(name: &'static str, value: u64, min: u64, max: u64) -> Result<u64, ConfigError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.customer_id, UNDEFINED_CUSTOMER);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.policy, ResiliencePolicy::default());
    }

    #[test]
    fn primary_variables_take_precedence_over_fallbacks() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SEQCONV_SERVER_URL", "https://primary.example"),
            ("SNAPGENE_WEB_URL", "https://fallback.example"),
        ]))
        .expect("valid");
        assert_eq!(config.base_url.host_str(), Some("primary.example"));

        let config =
            ClientConfig::from_lookup(lookup(&[("SNAPGENE_WEB_URL", "https://fallback.example")]))
                .expect("valid");
        assert_eq!(config.base_url.host_str(), Some("fallback.example"));
    }

    #[test]
    fn resilience_settings_are_read() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SEQCONV_RETRY_DELAY_MS", "10"),
            ("SEQCONV_MAX_ATTEMPTS", "5"),
            ("SEQCONV_SLIDING_WINDOW", "20"),
            ("SEQCONV_FAILURE_RATE", "75"),
            ("SEQCONV_CONNECT_TIMEOUT_MS", "500"),
            ("SEQCONV_CUSTOMER_ID", "lab-7"),
            ("SEQCONV_WORK_DIR", "/var/tmp/seqconv"),
        ]))
        .expect("valid");

        assert_eq!(
            config.policy.backoff,
            Backoff::Fixed {
                delay: Duration::from_millis(10)
            }
        );
        assert_eq!(config.policy.max_attempts, 5);
        assert_eq!(config.policy.sliding_window_size, 20);
        assert_eq!(config.policy.failure_rate_threshold, 75.0);
        assert_eq!(config.connect_timeout, Duration::from_millis(500));
        assert_eq!(config.customer_id, "lab-7");
        assert_eq!(config.work_dir, PathBuf::from("/var/tmp/seqconv"));
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let error = ClientConfig::from_lookup(lookup(&[("SEQCONV_MAX_ATTEMPTS", "three")]))
            .expect_err("not a number");
        assert_eq!(
            error,
            ConfigError::InvalidNumber {
                name: "SEQCONV_MAX_ATTEMPTS",
                value: String::from("three")
            }
        );

        let error = ClientConfig::from_lookup(lookup(&[("SEQCONV_FAILURE_RATE", "150")]))
            .expect_err("out of range");
        assert!(matches!(error, ConfigError::OutOfRange { max: 100, .. }));

        let error = ClientConfig::from_lookup(lookup(&[("SEQCONV_SERVER_URL", "ftp://x")]))
            .expect_err("bad scheme");
        assert!(matches!(error, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn blank_customer_id_is_rejected() {
        let error = ClientConfig::default()
            .with_customer_id("  ")
            .expect_err("blank id");
        assert_eq!(error, ConfigError::EmptyCustomerId);
    }
}
