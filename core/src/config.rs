//! Per-client configuration.
//!
//! Defaults reproduce the production settings: the public API host, a
//! User-Agent naming this crate and its version, and the 40 s connect and
//! 120 s read windows. Tests override the base URL and timeouts to talk to
//! the mock server.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.keepa.com";
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(40_000);
pub const READ_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Settings fixed for the lifetime of a `KeepaClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

fn default_user_agent() -> String {
    format!("KEEPA-RUST Framework-{}", env!("CARGO_PKG_VERSION"))
}
