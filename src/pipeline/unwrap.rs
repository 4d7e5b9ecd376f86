//! Reduce a raw agent response to the content worth rendering.
use serde_json::Value;
use tracing::debug;

use super::python_chart::extract_chart;
use crate::types::content::{AgentContent, GraphMetadata, NormalizedContent};
use crate::types::trace::{execution_trace, ExecutionTraceNode, ToolInvocation};
use crate::utils::{decode_embedded, parse_embedded_json, present, present_str};

/// Field carrying the agent's direct answer.
const DIRECT_ANSWER_FIELD: &str = "response";
/// Flat tool-output array used by older response shapes.
const LEGACY_TOOL_OUTPUT_FIELD: &str = "toolOutput";
/// Fields that mark a legacy tool output as structured content.
const LEGACY_MARKERS: [&str; 4] = ["graph_dot", "ate_plot", "visualization", "message"];

/// Unwrap a response of any shape.
///
/// Never fails: when nothing more specific can be found, the direct answer
/// field or the response itself is returned unchanged.
pub fn unwrap_response(response: &Value) -> AgentContent {
    let unwrapped = match execution_trace(response) {
        Some(nodes) => unwrap_trace(response, nodes).map(AgentContent::Structured),
        None => unwrap_legacy_tool_output(response),
    };
    unwrapped.unwrap_or_else(|| direct_answer(response))
}

fn direct_answer(response: &Value) -> AgentContent {
    AgentContent::from_value(present(response, DIRECT_ANSWER_FIELD).unwrap_or(response).clone())
}

/// What the tool invocations of one trace node yielded.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct ToolFindings<'a> {
    /// Code of the most recent code-execution call.
    code: Option<&'a str>,
    /// Output of the first graph-learning call.
    graph_output: Option<&'a Value>,
}

impl<'a> ToolFindings<'a> {
    fn collect(invocations: &[ToolInvocation<'a>]) -> Self {
        invocations
            .iter()
            .copied()
            .fold(Self::default(), |found, invocation| match invocation {
                ToolInvocation::CodeExecution { code } => Self {
                    code: Some(code),
                    ..found
                },
                ToolInvocation::GraphLearning { output } => Self {
                    graph_output: found.graph_output.or(Some(output)),
                    ..found
                },
                ToolInvocation::Other { .. } => found,
            })
    }
}

fn unwrap_trace<'a>(
    response: &'a Value,
    mut nodes: impl Iterator<Item = ExecutionTraceNode<'a>>,
) -> Option<NormalizedContent> {
    let Some(node) = nodes.find(ExecutionTraceNode::has_tool_invocations) else {
        debug!("Execution trace has no node with tool invocations");
        return None;
    };

    let text = node.content();
    let findings = ToolFindings::collect(&node.tool_invocations());
    let chart = findings.code.and_then(extract_chart);
    let graph = findings.graph_output.and_then(parse_graph_output);

    if chart.is_none() && graph.is_none() {
        return text.map(NormalizedContent::text);
    }

    let text = text.or_else(|| present_str(response, "text"));
    let mut content = NormalizedContent {
        text: text.map(String::from),
        ..Default::default()
    };
    if let Some(spec) = chart {
        let (data, layout) = spec.into_parts();
        content = content.with_chart(data, layout);
    }
    if let Some((graph_dot, metadata)) = graph {
        content = content.with_graph(graph_dot, metadata);
    }
    Some(content)
}

/// Decode the two-level graph tool envelope:
/// `[{"text": "{\"graph_dot\": ..., ...}"}]`.
pub fn parse_graph_output(output: &Value) -> Option<(String, GraphMetadata)> {
    let envelope = decode_embedded(output, "graph tool output")?;
    let Some(inner) = envelope.get(0).and_then(|first| present_str(first, "text")) else {
        debug!("Graph tool output has no text entry");
        return None;
    };
    let payload = parse_embedded_json(inner, "graph tool payload")?;
    let graph_dot = present_str(&payload, "graph_dot")?;
    Some((graph_dot.to_string(), GraphMetadata::from_value(&payload)))
}

fn unwrap_legacy_tool_output(response: &Value) -> Option<AgentContent> {
    let first = response
        .get(LEGACY_TOOL_OUTPUT_FIELD)?
        .as_array()?
        .first()?;

    let text = match (
        first.get("type").and_then(Value::as_str),
        first.get("text").and_then(Value::as_str),
    ) {
        (Some("text"), Some(text)) => text,
        _ => return Some(AgentContent::from_value(first.clone())),
    };

    let structured = text
        .trim_start()
        .starts_with('{')
        .then(|| parse_embedded_json(text, "legacy tool output"))
        .flatten()
        .filter(|parsed| LEGACY_MARKERS.iter().any(|key| present(parsed, key).is_some()));

    Some(match structured {
        Some(parsed) => AgentContent::from_value(parsed),
        None => AgentContent::Text(text.to_string()),
    })
}
