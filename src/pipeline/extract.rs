//! Produce the value a renderer consumes for a classified payload.
use serde_json::Value;
use tracing::warn;

use crate::types::content::{AgentContent, ContentKind, ExtractedContent, NormalizedContent};
use crate::utils::{decode_embedded, parse_embedded_json, present};

/// Extract the renderable value for `kind`.
///
/// When the content does not carry what `kind` promises, the best available
/// text is returned as markdown so nothing is dropped.
pub fn extract_content(content: &AgentContent, kind: ContentKind) -> ExtractedContent {
    let extracted = match kind {
        ContentKind::Graph => graph_description(content).map(ExtractedContent::Graph),
        ContentKind::Chart => {
            chart_pair(content).map(|(data, layout)| ExtractedContent::Chart { data, layout })
        }
        ContentKind::Combined => content.as_normalized().cloned().map(ExtractedContent::Combined),
        ContentKind::Html => Some(ExtractedContent::Html(best_text(content))),
        ContentKind::Markdown => Some(ExtractedContent::Markdown(best_text(content))),
    };

    extracted.unwrap_or_else(|| {
        warn!("Content classified as {} lacks the matching payload, showing it as text", kind);
        ExtractedContent::Markdown(best_text(content))
    })
}

fn graph_description(content: &AgentContent) -> Option<String> {
    match content {
        AgentContent::Structured(normalized) if normalized.has_graph() => {
            normalized.graph_dot.clone()
        }
        AgentContent::Text(text) => Some(text.clone()),
        _ => None,
    }
}

/// The `(data, layout)` pair, unwrapping tool-wrapped and aliased payloads first.
fn chart_pair(content: &AgentContent) -> Option<(Value, Value)> {
    let payload = match content {
        AgentContent::Structured(normalized) => chart_payload(normalized)?,
        AgentContent::Text(text) => parse_embedded_json(text, "chart json")?,
        AgentContent::Other(_) => return None,
    };
    let data = present(&payload, "data")?.clone();
    let layout = present(&payload, "layout")?.clone();
    Some((data, layout))
}

fn chart_payload(normalized: &NormalizedContent) -> Option<Value> {
    if let Some(output) = normalized.wrapped_tool_output() {
        return decode_embedded(output, "code tool output");
    }
    if let Some(alias) = normalized.chart_alias() {
        return decode_embedded(alias, "chart payload");
    }
    Some(normalized.to_value())
}

/// Text fields in order of preference, else an indented dump of the payload.
pub fn best_text(content: &AgentContent) -> String {
    match content {
        AgentContent::Text(text) => text.clone(),
        AgentContent::Structured(normalized) => normalized
            .best_text()
            .map(String::from)
            .unwrap_or_else(|| normalized.pretty()),
        AgentContent::Other(value) => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classify::classify;
    use serde_json::json;

    fn content(value: Value) -> AgentContent {
        AgentContent::from_value(value)
    }

    #[test]
    fn test_graph_extraction() {
        let extracted = extract_content(
            &content(json!({"graph_dot": "digraph G { A -> B }"})),
            ContentKind::Graph,
        );
        assert_eq!(extracted, ExtractedContent::Graph("digraph G { A -> B }".into()));

        let extracted = extract_content(&content(json!("digraph { x }")), ContentKind::Graph);
        assert_eq!(extracted, ExtractedContent::Graph("digraph { x }".into()));
    }

    #[test]
    fn test_chart_extraction() {
        let extracted = extract_content(
            &content(json!({"data": [{"x": [1]}], "layout": {"title": "t"}, "extra": 1})),
            ContentKind::Chart,
        );
        assert_eq!(
            extracted,
            ExtractedContent::Chart {
                data: json!([{"x": [1]}]),
                layout: json!({"title": "t"})
            }
        );
    }

    #[test]
    fn test_chart_from_string() {
        let extracted = extract_content(
            &content(json!(r#"{"data": [1], "layout": {"title": "s"}}"#)),
            ContentKind::Chart,
        );
        assert_eq!(
            extracted,
            ExtractedContent::Chart {
                data: json!([1]),
                layout: json!({"title": "s"})
            }
        );
    }

    #[test]
    fn test_tool_wrapped_chart() {
        let wrapped = content(json!({
            "tool": "code_interpreter",
            "toolOutput": "{\"data\": [2], \"layout\": {\"title\": \"w\"}}"
        }));
        assert_eq!(classify(&wrapped), ContentKind::Chart);
        assert_eq!(
            extract_content(&wrapped, ContentKind::Chart),
            ExtractedContent::Chart {
                data: json!([2]),
                layout: json!({"title": "w"})
            }
        );
    }

    #[test]
    fn test_aliased_chart() {
        let aliased = content(json!({"ate_plot": {"data": [3], "layout": {}}}));
        assert_eq!(
            extract_content(&aliased, ContentKind::Chart),
            ExtractedContent::Chart {
                data: json!([3]),
                layout: json!({})
            }
        );
    }

    #[test]
    fn test_malformed_chart_falls_back_to_text() {
        let broken = content(json!({"visualization": "{not json", "note": "see chart"}));
        assert_eq!(classify(&broken), ContentKind::Chart);
        assert_eq!(
            extract_content(&broken, ContentKind::Chart),
            ExtractedContent::Markdown("see chart".into())
        );
    }

    #[test]
    fn test_combined_keeps_everything() {
        let combined = content(json!({
            "text": "Result",
            "graph_dot": "digraph { a }",
            "edges_count": 0
        }));
        match extract_content(&combined, ContentKind::Combined) {
            ExtractedContent::Combined(normalized) => {
                assert_eq!(normalized.text.as_deref(), Some("Result"));
                assert_eq!(normalized.graph_dot.as_deref(), Some("digraph { a }"));
                assert_eq!(normalized.graph.edges_count, Some(0));
            }
            other => panic!("expected combined content, got {:?}", other),
        }
    }

    #[test]
    fn test_text_fallback_order() {
        let markdown = |value| extract_content(&content(value), ContentKind::Markdown);

        assert_eq!(
            markdown(json!({"text": "t", "message": "m", "note": "n"})),
            ExtractedContent::Markdown("t".into())
        );
        assert_eq!(
            markdown(json!({"message": "m", "note": "n"})),
            ExtractedContent::Markdown("m".into())
        );
        assert_eq!(markdown(json!({"note": "n"})), ExtractedContent::Markdown("n".into()));
    }

    #[test]
    fn test_structural_dump_when_no_text() {
        let extracted = extract_content(&content(json!({"score": 3})), ContentKind::Markdown);
        assert_eq!(extracted, ExtractedContent::Markdown("{\n  \"score\": 3\n}".into()));

        let extracted = extract_content(&content(json!([1])), ContentKind::Markdown);
        assert_eq!(extracted, ExtractedContent::Markdown("[\n  1\n]".into()));
    }

    #[test]
    fn test_html_extraction() {
        let extracted = extract_content(&content(json!("<table></table>")), ContentKind::Html);
        assert_eq!(extracted, ExtractedContent::Html("<table></table>".into()));
    }
}
