//! Provider settings resolved from defaults and the environment.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `PRICESHEET_TIMEOUT_MS` | Per-request timeout; unset waits indefinitely |
//! | `PRICESHEET_USER_AGENT` | User agent sent to the provider |
//! | `PRICESHEET_YAHOO_COOKIE` | Session cookie to use instead of the cookie/crumb handshake |

use std::env;

use tracing::warn;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Endpoints and transport settings for the Yahoo Finance adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub search_url: String,
    pub chart_url: String,
    pub cookie_url: String,
    pub crumb_url: String,
    pub user_agent: String,
    pub timeout_ms: Option<u64>,
    pub cookie_override: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            search_url: String::from("https://query2.finance.yahoo.com/v1/finance/search"),
            chart_url: String::from("https://query2.finance.yahoo.com/v8/finance/chart"),
            cookie_url: String::from("https://fc.yahoo.com"),
            crumb_url: String::from("https://query1.finance.yahoo.com/v1/test/getcrumb"),
            user_agent: String::from(DEFAULT_USER_AGENT),
            timeout_ms: None,
            cookie_override: None,
        }
    }
}

impl SourceConfig {
    /// Defaults overlaid with `PRICESHEET_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_lookup(|key| env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup; empty values are ignored.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(raw) = read("PRICESHEET_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(timeout_ms) => self.timeout_ms = Some(timeout_ms),
                Err(_) => warn!(value = %raw, "ignoring non-numeric PRICESHEET_TIMEOUT_MS"),
            }
        }
        if let Some(user_agent) = read("PRICESHEET_USER_AGENT") {
            self.user_agent = user_agent;
        }
        if let Some(cookie) = read("PRICESHEET_YAHOO_COOKIE") {
            self.cookie_override = Some(cookie);
        }

        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        if timeout_ms.is_some() {
            self.timeout_ms = timeout_ms;
        }
        self
    }
}
