use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{base::Transport, config::AgentEndpointConfig};
use crate::errors::{TransportError, TransportResult};

/// HTTP transport posting `{"question": ..}` to the agent endpoint.
pub struct AgentClient {
    client: Client,
    config: AgentEndpointConfig,
}

impl AgentClient {
    pub fn new(config: AgentEndpointConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AgentEndpointConfig {
        &self.config
    }

    fn post(&self, payload: Value) -> TransportResult<Value> {
        debug!("Posting question to {}", self.config.endpoint);
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .map_err(TransportError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        response.json().map_err(TransportError::Decode)
    }
}

impl Transport for AgentClient {
    fn ask(&self, question: &str) -> TransportResult<Value> {
        self.post(json!({ "question": question }))
    }

    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn set_endpoint(&mut self, endpoint: String) {
        self.config.endpoint = endpoint;
    }
}
