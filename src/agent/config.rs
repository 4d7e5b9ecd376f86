use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/agent";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

const ENDPOINT_VAR: &str = "AGENT_ENDPOINT";
const TIMEOUT_VAR: &str = "AGENT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct AgentEndpointConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl AgentEndpointConfig {
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `AGENT_ENDPOINT` and `AGENT_TIMEOUT_SECS`, both optional.
    pub fn from_env() -> Result<Self> {
        let endpoint = optional_env(ENDPOINT_VAR)?.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout = match optional_env(TIMEOUT_VAR)? {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .with_context(|| {
                    format!(
                        "{} must be a whole number of seconds, got '{}'",
                        TIMEOUT_VAR, secs
                    )
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(endpoint).with_timeout(Duration::from_secs(timeout)))
    }
}

impl Default for AgentEndpointConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

fn optional_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow!("Environment variable '{}' is not usable: {}", key, e)),
    }
}
