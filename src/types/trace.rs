//! Borrowed views over the agent's execution trace.
//!
//! The trace is schema-less JSON. Each accessor here performs one traversal
//! step and reports a missing or mistyped field as `None`.
use serde_json::Value;

use crate::utils::{present, present_str};

/// Top-level field holding the execution trace.
pub const EXECUTION_TRACE_FIELD: &str = "agentFlowExecutedData";
/// Tool that runs agent-written code.
pub const CODE_EXECUTION_TOOL: &str = "code_interpreter";
/// Tool that learns a causal graph and reports it as DOT.
pub const GRAPH_LEARNING_TOOL: &str = "learn_and_plot_causal_graph";

/// Iterate the trace nodes of a response, if it carries a trace array.
pub fn execution_trace(response: &Value) -> Option<impl Iterator<Item = ExecutionTraceNode<'_>>> {
    let nodes = response.get(EXECUTION_TRACE_FIELD)?.as_array()?;
    Some(nodes.iter().filter_map(ExecutionTraceNode::from_value))
}

/// One node of the execution trace, viewed through its `data.output` object.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionTraceNode<'a> {
    output: &'a Value,
}

impl<'a> ExecutionTraceNode<'a> {
    pub fn from_value(node: &'a Value) -> Option<Self> {
        let output = node.get("data")?.get("output")?;
        output.is_object().then_some(Self { output })
    }

    /// Free text the node produced.
    pub fn content(&self) -> Option<&'a str> {
        present_str(self.output, "content")
    }

    fn used_tools(&self) -> Option<&'a Vec<Value>> {
        self.output.get("usedTools")?.as_array()
    }

    pub fn has_tool_invocations(&self) -> bool {
        self.used_tools().is_some_and(|tools| !tools.is_empty())
    }

    /// The node's tool invocations in recorded order.
    pub fn tool_invocations(&self) -> Vec<ToolInvocation<'a>> {
        self.used_tools()
            .map(|tools| tools.iter().map(ToolInvocation::from_value).collect())
            .unwrap_or_default()
    }
}

/// A recorded tool call, tagged by the capability the pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolInvocation<'a> {
    /// Code execution with a non-empty code string.
    CodeExecution { code: &'a str },
    /// Graph learning with a present output, still undecoded.
    GraphLearning { output: &'a Value },
    /// Any other call, or a known tool missing its payload.
    Other { name: Option<&'a str> },
}

impl<'a> ToolInvocation<'a> {
    pub fn from_value(record: &'a Value) -> Self {
        let name = record.get("tool").and_then(Value::as_str);
        match name {
            Some(CODE_EXECUTION_TOOL) => record
                .get("toolInput")
                .and_then(|input| present_str(input, "input"))
                .map(|code| ToolInvocation::CodeExecution { code })
                .unwrap_or(ToolInvocation::Other { name }),
            Some(GRAPH_LEARNING_TOOL) => present(record, "toolOutput")
                .map(|output| ToolInvocation::GraphLearning { output })
                .unwrap_or(ToolInvocation::Other { name }),
            _ => ToolInvocation::Other { name },
        }
    }

    pub fn code(&self) -> Option<&'a str> {
        match self {
            ToolInvocation::CodeExecution { code } => Some(code),
            _ => None,
        }
    }

    pub fn graph_output(&self) -> Option<&'a Value> {
        match self {
            ToolInvocation::GraphLearning { output } => Some(output),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_node_requires_output_object() {
        assert!(ExecutionTraceNode::from_value(&json!({"data": {"output": {}}})).is_some());
        assert!(ExecutionTraceNode::from_value(&json!({"data": {"output": "x"}})).is_none());
        assert!(ExecutionTraceNode::from_value(&json!({"data": {}})).is_none());
        assert!(ExecutionTraceNode::from_value(&json!("node")).is_none());
    }

    #[test]
    fn test_execution_trace_skips_malformed_nodes() {
        let response = json!({
            "agentFlowExecutedData": [
                "garbage",
                {"data": {"output": {"content": "first"}}},
                {"data": null},
                {"data": {"output": {"content": "second"}}}
            ]
        });
        let contents: Vec<_> = execution_trace(&response)
            .map(|nodes| nodes.filter_map(|n| n.content()).collect())
            .unwrap_or_default();
        assert_eq!(contents, vec!["first", "second"]);

        assert!(execution_trace(&json!({"agentFlowExecutedData": {}})).is_none());
        assert!(execution_trace(&json!("text")).is_none());
    }

    #[test]
    fn test_tool_invocations() {
        let node = json!({"data": {"output": {"usedTools": [
            {"tool": "code_interpreter", "toolInput": {"input": "print(1)"}},
            {"tool": "code_interpreter", "toolInput": {"input": ""}},
            {"tool": "learn_and_plot_causal_graph", "toolOutput": "[]"},
            {"tool": "learn_and_plot_causal_graph"},
            {"tool": "search"},
            42
        ]}}});
        let node = ExecutionTraceNode::from_value(&node).unwrap();
        assert!(node.has_tool_invocations());

        let tools = node.tool_invocations();
        assert_eq!(tools.len(), 6);
        assert_eq!(tools[0].code(), Some("print(1)"));
        assert_eq!(tools[1], ToolInvocation::Other { name: Some("code_interpreter") });
        assert_eq!(tools[2].graph_output(), Some(&json!("[]")));
        assert!(tools[3].graph_output().is_none());
        assert_eq!(tools[4], ToolInvocation::Other { name: Some("search") });
        assert_eq!(tools[5], ToolInvocation::Other { name: None });
    }

    #[test]
    fn test_empty_tool_list_is_not_an_invocation_node() {
        let node = json!({"data": {"output": {"usedTools": [], "content": "hi"}}});
        let node = ExecutionTraceNode::from_value(&node).unwrap();
        assert!(!node.has_tool_invocations());
        assert!(node.tool_invocations().is_empty());
    }
}
