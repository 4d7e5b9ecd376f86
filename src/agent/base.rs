use serde_json::Value;

use crate::errors::TransportResult;

/// Sends questions to the agent and returns its raw, unnormalized reply.
pub trait Transport {
    /// Ask one question. The reply is whatever JSON the agent produced.
    fn ask(&self, question: &str) -> TransportResult<Value>;

    /// The endpoint questions are currently sent to.
    fn endpoint(&self) -> &str;

    /// Point later questions at a different endpoint.
    fn set_endpoint(&mut self, endpoint: String);
}
