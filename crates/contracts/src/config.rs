//! OutputConfig - Config Loader output
//!
//! Settings consumed once when the engine is constructed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

/// Default number of entries per bulk call
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Default flush interval (seconds)
pub const DEFAULT_BATCH_FLUSH_INTERVAL_SECS: u64 = 10;
/// Default number of delivery workers
pub const DEFAULT_CONCURRENCY: usize = 4;
/// Default per-request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default dispatch channel capacity, as a multiple of `concurrency`
pub const DEFAULT_QUEUE_CAPACITY_FACTOR: usize = 3;

/// Bulk output configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct OutputConfig {
    /// Remote base addresses, one is picked per bulk call
    #[validate(length(min = 1, message = "at least one address is required"))]
    pub addresses: Vec<String>,

    /// Basic auth user
    #[validate(length(min = 1, message = "username cannot be empty"))]
    pub username: String,

    /// Basic auth password
    #[validate(length(min = 1, message = "password cannot be empty"))]
    pub password: String,

    /// Destination index pattern (e.g. `logs-%{service}-%{+%Y.%m.%d}`)
    #[validate(length(min = 1, message = "index pattern cannot be empty"))]
    pub index: String,

    /// Entries per bulk call
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1, message = "batch_size must be > 0"))]
    pub batch_size: usize,

    /// Flush interval in seconds
    #[serde(default = "default_batch_flush_interval")]
    #[validate(range(min = 1, message = "batch_flush_interval must be > 0"))]
    pub batch_flush_interval: u64,

    /// Number of concurrent delivery workers
    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, message = "concurrency must be > 0"))]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, message = "request_timeout must be > 0"))]
    pub request_timeout: u64,

    /// Dispatch channel capacity = factor * concurrency
    #[serde(default = "default_queue_capacity_factor")]
    #[validate(range(min = 1, message = "queue_capacity_factor must be > 0"))]
    pub queue_capacity_factor: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_batch_flush_interval() -> u64 {
    DEFAULT_BATCH_FLUSH_INTERVAL_SECS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_queue_capacity_factor() -> usize {
    DEFAULT_QUEUE_CAPACITY_FACTOR
}

impl OutputConfig {
    /// Config with the required fields set and every optional one defaulted
    pub fn new(
        addresses: Vec<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            addresses,
            username: username.into(),
            password: password.into(),
            index: index.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_flush_interval: DEFAULT_BATCH_FLUSH_INTERVAL_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            queue_capacity_factor: DEFAULT_QUEUE_CAPACITY_FACTOR,
        }
    }

    /// Flush interval as a `Duration`
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.batch_flush_interval)
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Bounded capacity of the dispatch channel
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity_factor.saturating_mul(self.concurrency).max(1)
    }

    /// Credentials attached to every outbound call
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}

impl fmt::Debug for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputConfig")
            .field("addresses", &self.addresses)
            .field("username", &self.username)
            .field("password", &"***")
            .field("index", &self.index)
            .field("batch_size", &self.batch_size)
            .field("batch_flush_interval", &self.batch_flush_interval)
            .field("concurrency", &self.concurrency)
            .field("request_timeout", &self.request_timeout)
            .field("queue_capacity_factor", &self.queue_capacity_factor)
            .finish()
    }
}

/// Basic auth credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OutputConfig {
        OutputConfig::new(
            vec!["http://127.0.0.1:4080".into()],
            "admin",
            "s3cret",
            "logs",
        )
    }

    #[test]
    fn test_defaults() {
        let cfg = config();
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.flush_interval(), Duration::from_secs(10));
        assert_eq!(cfg.concurrency, 4);
        assert_eq!(cfg.queue_capacity(), 12);
    }

    #[test]
    fn test_debug_redacts_password() {
        let cfg = config();
        let out = format!("{cfg:?}");
        assert!(!out.contains("s3cret"), "got: {out}");
        let creds = format!("{:?}", cfg.credentials());
        assert!(!creds.contains("s3cret"), "got: {creds}");
        assert!(creds.contains("admin"));
    }

    #[test]
    fn test_field_rules() {
        let mut cfg = config();
        assert!(cfg.validate().is_ok());

        cfg.batch_size = 0;
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("batch_size"));

        let mut cfg = config();
        cfg.addresses.clear();
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("addresses"));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let json = r#"{
            "addresses": ["http://a:4080"],
            "username": "u",
            "password": "p",
            "index": "logs"
        }"#;
        let cfg: OutputConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(cfg.batch_flush_interval, DEFAULT_BATCH_FLUSH_INTERVAL_SECS);
        assert_eq!(cfg.concurrency, DEFAULT_CONCURRENCY);
    }
}
