//! Environment-driven runtime settings.

use std::net::SocketAddr;
use std::time::Duration;

use completion_client::Provider;
use tracing::warn;

use crate::aggregate::DEFAULT_ADAPTER_TIMEOUT;
use crate::memory::DEFAULT_RETENTION_DAYS;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct Settings {
    pub completion_provider: Provider,
    pub bind_addr: SocketAddr,
    pub adapter_timeout: Duration,
    pub memory_retention_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            completion_provider: Provider::default(),
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("default bind addr"),
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            memory_retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl Settings {
    /// Reads `SCOUT_*` variables, falling back to defaults on anything
    /// missing or unparseable. Bad values are logged, never fatal.
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self {
            completion_provider: Provider::from_env(),
            ..Self::default()
        };

        if let Ok(raw) = std::env::var("SCOUT_BIND_ADDR") {
            match raw.parse() {
                Ok(addr) => settings.bind_addr = addr,
                Err(_) => warn!(%raw, "ignoring invalid SCOUT_BIND_ADDR"),
            }
        }

        if let Ok(raw) = std::env::var("SCOUT_ADAPTER_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => settings.adapter_timeout = Duration::from_millis(ms),
                _ => warn!(%raw, "ignoring invalid SCOUT_ADAPTER_TIMEOUT_MS"),
            }
        }

        if let Ok(raw) = std::env::var("SCOUT_MEMORY_RETENTION_DAYS") {
            match raw.parse::<i64>() {
                Ok(days) if days > 0 => settings.memory_retention_days = days,
                _ => warn!(%raw, "ignoring invalid SCOUT_MEMORY_RETENTION_DAYS"),
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr.port(), 8080);
        assert_eq!(settings.adapter_timeout, Duration::from_secs(4));
        assert_eq!(settings.memory_retention_days, 14);
        assert_eq!(settings.completion_provider, Provider::Groq);
    }
}
