//! Normalization of agent responses: unwrap, classify, extract.
//!
//! Every stage is a pure, total function of its input. Malformed payloads
//! degrade to a narrower kind of content, never to an error.
pub mod classify;
pub mod extract;
pub mod python_chart;
pub mod unwrap;

use serde_json::Value;
use tracing::debug;

use crate::types::content::{AgentContent, ContentKind, ExtractedContent};

pub use classify::classify;
pub use extract::extract_content;
pub use python_chart::extract_chart;
pub use unwrap::unwrap_response;

/// A response reduced to its content and the kind it renders as.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub content: AgentContent,
    pub kind: ContentKind,
}

impl Normalized {
    /// The value handed to the renderer for this content.
    pub fn extracted(&self) -> ExtractedContent {
        extract_content(&self.content, self.kind)
    }
}

/// Run one raw agent response through the pipeline.
pub fn normalize(response: &Value) -> Normalized {
    let content = unwrap_response(response);
    let kind = classify(&content);
    debug!("Normalized agent response as {}", kind);
    Normalized { content, kind }
}
