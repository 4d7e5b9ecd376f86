use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::trace::CODE_EXECUTION_TOOL;
use crate::utils::is_truthy;

/// Fields some response shapes use in place of `data`/`layout`.
pub const CHART_ALIASES: [&str; 2] = ["ate_plot", "visualization"];
/// Fields some response shapes use in place of `text`.
pub const TEXT_ALIASES: [&str; 2] = ["message", "note"];

/// The single kind assigned to a normalized payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Markdown,
    Html,
    Chart,
    Graph,
    Combined,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Markdown => "markdown",
            ContentKind::Html => "html",
            ContentKind::Chart => "chart",
            ContentKind::Graph => "graph",
            ContentKind::Combined => "combined",
        };
        f.write_str(name)
    }
}

/// Metadata reported by the graph-learning tool next to its `graph_dot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_used: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjacency_matrix_shape: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_zero_weights: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_features: Option<Vec<String>>,
}

impl GraphMetadata {
    /// Read whichever metadata fields carry the expected type, ignoring the rest.
    pub fn from_value(value: &Value) -> Self {
        Self {
            threshold_used: value.get("threshold_used").and_then(Value::as_f64),
            edges_count: value.get("edges_count").and_then(Value::as_u64),
            adjacency_matrix_shape: value
                .get("adjacency_matrix_shape")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            non_zero_weights: value.get("non_zero_weights").and_then(Value::as_u64),
            selected_features: value
                .get("selected_features")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Intermediate result of unwrapping an agent response.
///
/// Every field is optional; anything the pipeline has no name for is kept in
/// `extra` so that nothing the agent sent is lost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_dot: Option<String>,
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<Value>,
    #[serde(rename = "layout", default, skip_serializing_if = "Option::is_none")]
    pub chart_layout: Option<Value>,
    #[serde(flatten)]
    pub graph: GraphMetadata,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NormalizedContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Build from an arbitrary JSON object. Known fields with an unexpected
    /// type stay in `extra` rather than failing the conversion.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let graph = GraphMetadata::from_value(&Value::Object(map.clone()));
        for (key, taken) in [
            ("threshold_used", graph.threshold_used.is_some()),
            ("edges_count", graph.edges_count.is_some()),
            ("adjacency_matrix_shape", graph.adjacency_matrix_shape.is_some()),
            ("non_zero_weights", graph.non_zero_weights.is_some()),
            ("selected_features", graph.selected_features.is_some()),
        ] {
            if taken {
                map.remove(key);
            }
        }

        Self {
            text: take_string(&mut map, "text"),
            graph_dot: take_string(&mut map, "graph_dot"),
            chart_data: map.remove("data"),
            chart_layout: map.remove("layout"),
            graph,
            extra: map,
        }
    }

    pub fn with_chart(mut self, data: Value, layout: Value) -> Self {
        self.chart_data = Some(data);
        self.chart_layout = Some(layout);
        self
    }

    pub fn with_graph<S: Into<String>>(mut self, graph_dot: S, metadata: GraphMetadata) -> Self {
        self.graph_dot = Some(graph_dot.into());
        self.graph = metadata;
        self
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_graph(&self) -> bool {
        self.graph_dot.as_deref().is_some_and(|g| !g.is_empty())
    }

    /// Both halves of a chart are present.
    pub fn has_chart(&self) -> bool {
        let truthy = |v: &Option<Value>| v.as_ref().is_some_and(is_truthy);
        truthy(&self.chart_data) && truthy(&self.chart_layout)
    }

    /// Look up a field outside the named ones, keeping it only when truthy.
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key).filter(|v| is_truthy(v))
    }

    pub fn chart_alias(&self) -> Option<&Value> {
        CHART_ALIASES.iter().find_map(|key| self.extra_field(key))
    }

    /// A code-execution tool record passed through as the payload itself.
    pub fn wrapped_tool_output(&self) -> Option<&Value> {
        let tool = self.extra.get("tool").and_then(Value::as_str)?;
        (tool == CODE_EXECUTION_TOOL)
            .then(|| self.extra_field("toolOutput"))
            .flatten()
    }

    pub fn text_alias(&self) -> Option<&str> {
        TEXT_ALIASES
            .iter()
            .find_map(|key| self.extra_field(key).and_then(Value::as_str))
    }

    /// `text`, then the text aliases.
    pub fn best_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.text_alias())
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Indented JSON dump, used when there is no text to show.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            map.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

/// Content of a message: plain text or a structured payload, with anything
/// else carried as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentContent {
    Text(String),
    Structured(NormalizedContent),
    Other(Value),
}

impl AgentContent {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => AgentContent::Text(s),
            Value::Object(map) => AgentContent::Structured(NormalizedContent::from_map(map)),
            other => AgentContent::Other(other),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AgentContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_normalized(&self) -> Option<&NormalizedContent> {
        match self {
            AgentContent::Structured(content) => Some(content),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            AgentContent::Text(text) => Value::String(text.clone()),
            AgentContent::Structured(content) => content.to_value(),
            AgentContent::Other(value) => value.clone(),
        }
    }
}

impl From<Value> for AgentContent {
    fn from(value: Value) -> Self {
        AgentContent::from_value(value)
    }
}

impl From<NormalizedContent> for AgentContent {
    fn from(content: NormalizedContent) -> Self {
        AgentContent::Structured(content)
    }
}

impl From<&str> for AgentContent {
    fn from(text: &str) -> Self {
        AgentContent::Text(text.to_string())
    }
}

/// The value handed to a renderer, tagged by what it renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedContent {
    Markdown(String),
    Html(String),
    Chart { data: Value, layout: Value },
    Graph(String),
    Combined(NormalizedContent),
}

impl ExtractedContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            ExtractedContent::Markdown(_) => ContentKind::Markdown,
            ExtractedContent::Html(_) => ContentKind::Html,
            ExtractedContent::Chart { .. } => ContentKind::Chart,
            ExtractedContent::Graph(_) => ContentKind::Graph,
            ExtractedContent::Combined(_) => ContentKind::Combined,
        }
    }

    /// Turn the extracted value back into message content.
    pub fn into_content(self) -> AgentContent {
        match self {
            ExtractedContent::Markdown(text) => {
                AgentContent::Structured(NormalizedContent::text(text))
            }
            ExtractedContent::Html(text) => AgentContent::Text(text),
            ExtractedContent::Graph(graph_dot) => AgentContent::Structured(
                NormalizedContent::default().with_graph(graph_dot, GraphMetadata::default()),
            ),
            ExtractedContent::Chart { data, layout } => {
                AgentContent::Structured(NormalizedContent::default().with_chart(data, layout))
            }
            ExtractedContent::Combined(content) => AgentContent::Structured(content),
        }
    }
}
