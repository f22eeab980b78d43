use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Settings of the HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn parse_timeout_secs(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

impl AdapterConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `FORMFLOW_API_BASE` and `FORMFLOW_API_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(api_base) = std::env::var("FORMFLOW_API_BASE") {
            if !api_base.trim().is_empty() {
                config.api_base = api_base.trim().to_string();
            }
        }
        if let Ok(timeout) = std::env::var("FORMFLOW_API_TIMEOUT_SECS") {
            match parse_timeout_secs(&timeout) {
                Some(parsed) => config.timeout = parsed,
                None => tracing::warn!(
                    value = %timeout,
                    "ignoring invalid FORMFLOW_API_TIMEOUT_SECS"
                ),
            }
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `api_base` joined with `path`, without doubled slashes.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_accepts_positive_seconds() {
        assert_eq!(parse_timeout_secs(" 30 "), Some(Duration::from_secs(30)));
        for value in ["0", "-1", "abc", ""] {
            assert_eq!(parse_timeout_secs(value), None, "value {value:?} should be rejected");
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = AdapterConfig::new("http://backend:8000/");
        assert_eq!(config.url("/conversations"), "http://backend:8000/conversations");
        assert_eq!(config.url("health"), "http://backend:8000/health");
    }
}
