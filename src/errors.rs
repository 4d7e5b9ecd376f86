use thiserror::Error;

/// Failures talking to the agent endpoint. These bypass normalization.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to reach agent endpoint: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Agent response was not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;
