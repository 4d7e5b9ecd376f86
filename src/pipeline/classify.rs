//! Assign a [`ContentKind`] to normalized content.
//!
//! Classification is an ordered list of rules over a [`PayloadView`]; the first
//! rule that applies decides the kind, and content no rule claims is markdown.
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::types::content::{AgentContent, ContentKind};
use crate::utils::present;

lazy_static! {
    /// `digraph ... {` anywhere, or a `[strict] graph ... {` header at the start.
    static ref GRAPH_HEADER: Regex =
        Regex::new(r"\bdigraph\b[^{}]*\{|^\s*(?:strict\s+)?graph\b[^{}]*\{").unwrap();
}

const TABLE_MARKUP: [&str; 3] = ["<table", "<tr", "<td"];

/// The fields of a payload the rules look at, each reduced to presence.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PayloadView<'a> {
    pub text: bool,
    pub text_alias: bool,
    pub graph: bool,
    pub chart: bool,
    pub chart_alias: bool,
    /// The payload itself when it is a bare string.
    pub raw_text: Option<&'a str>,
}

impl<'a> PayloadView<'a> {
    pub fn of(content: &'a AgentContent) -> Self {
        match content {
            AgentContent::Structured(content) => Self {
                text: content.has_text(),
                text_alias: content.text_alias().is_some(),
                graph: content.has_graph(),
                chart: content.has_chart(),
                chart_alias: content.chart_alias().is_some()
                    || content.wrapped_tool_output().is_some(),
                raw_text: None,
            },
            AgentContent::Text(text) => Self {
                raw_text: Some(text),
                ..Default::default()
            },
            AgentContent::Other(_) => Self::default(),
        }
    }
}

struct Rule {
    name: &'static str,
    applies: fn(&PayloadView) -> bool,
    kind: ContentKind,
}

/// Evaluated top to bottom. The order is the precedence.
const RULES: [Rule; 7] = [
    Rule {
        name: "text with visualization",
        applies: text_with_visualization,
        kind: ContentKind::Combined,
    },
    Rule {
        name: "graph description",
        applies: has_graph,
        kind: ContentKind::Graph,
    },
    Rule {
        name: "chart",
        applies: has_chart,
        kind: ContentKind::Chart,
    },
    Rule {
        name: "text",
        applies: has_text,
        kind: ContentKind::Markdown,
    },
    Rule {
        name: "graph description string",
        applies: is_graph_string,
        kind: ContentKind::Graph,
    },
    Rule {
        name: "chart json string",
        applies: is_chart_string,
        kind: ContentKind::Chart,
    },
    Rule {
        name: "table markup string",
        applies: is_table_string,
        kind: ContentKind::Html,
    },
];

/// Classify content into exactly one kind. Total: never fails.
pub fn classify(content: &AgentContent) -> ContentKind {
    let view = PayloadView::of(content);
    RULES
        .iter()
        .find(|rule| (rule.applies)(&view))
        .map(|rule| {
            tracing::debug!("Classified as {} by the {} rule", rule.kind, rule.name);
            rule.kind
        })
        .unwrap_or(ContentKind::Markdown)
}

fn text_with_visualization(view: &PayloadView) -> bool {
    view.text && (view.graph || view.chart)
}

fn has_graph(view: &PayloadView) -> bool {
    view.graph
}

fn has_chart(view: &PayloadView) -> bool {
    view.chart || view.chart_alias
}

fn has_text(view: &PayloadView) -> bool {
    view.text || view.text_alias
}

fn is_graph_string(view: &PayloadView) -> bool {
    view.raw_text.is_some_and(is_graph_description)
}

fn is_chart_string(view: &PayloadView) -> bool {
    view.raw_text.is_some_and(is_chart_json)
}

fn is_table_string(view: &PayloadView) -> bool {
    view.raw_text.is_some_and(has_table_markup)
}

/// A graph keyword opening a block, with balanced braces overall.
pub fn is_graph_description(text: &str) -> bool {
    GRAPH_HEADER.is_match(text) && braces_balanced(text)
}

fn braces_balanced(text: &str) -> bool {
    let mut depth: usize = 0;
    for c in text.chars() {
        match c {
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// A JSON object with both `data` and `layout`.
pub fn is_chart_json(text: &str) -> bool {
    if !text.trim_start().starts_with('{')
        || !text.contains("\"data\"")
        || !text.contains("\"layout\"")
    {
        return false;
    }
    // Only a probe: text that is not JSON is simply not a chart.
    serde_json::from_str::<Value>(text)
        .map(|parsed| present(&parsed, "data").is_some() && present(&parsed, "layout").is_some())
        .unwrap_or(false)
}

pub fn has_table_markup(text: &str) -> bool {
    TABLE_MARKUP.iter().any(|tag| text.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind_of(value: Value) -> ContentKind {
        classify(&AgentContent::from_value(value))
    }

    #[test]
    fn test_rule_predicates_in_isolation() {
        let view = PayloadView {
            text: true,
            graph: true,
            ..Default::default()
        };
        assert!(text_with_visualization(&view));
        assert!(has_graph(&view));
        assert!(!has_chart(&view));

        let view = PayloadView {
            chart_alias: true,
            ..Default::default()
        };
        assert!(has_chart(&view));
        assert!(!text_with_visualization(&view));

        let view = PayloadView {
            raw_text: Some("<table><tr><td>1</td></tr></table>"),
            ..Default::default()
        };
        assert!(is_table_string(&view));
        assert!(!is_graph_string(&view));
    }

    #[test]
    fn test_combined_precedence() {
        assert_eq!(
            kind_of(json!({"text": "Result", "graph_dot": "digraph G { A -> B }"})),
            ContentKind::Combined
        );
        assert_eq!(
            kind_of(json!({"text": "Result", "data": [{"x": [1]}], "layout": {"title": "t"}})),
            ContentKind::Combined
        );
    }

    #[test]
    fn test_structured_kinds() {
        assert_eq!(kind_of(json!({"graph_dot": "digraph G { A -> B }"})), ContentKind::Graph);
        assert_eq!(
            kind_of(json!({"graph_dot": "digraph { a }", "data": [1], "layout": {}})),
            ContentKind::Graph
        );
        assert_eq!(kind_of(json!({"data": [], "layout": {}})), ContentKind::Chart);
        assert_eq!(kind_of(json!({"ate_plot": {"data": []}})), ContentKind::Chart);
        assert_eq!(kind_of(json!({"visualization": "{}"})), ContentKind::Chart);
        assert_eq!(
            kind_of(json!({"tool": "code_interpreter", "toolOutput": "{}"})),
            ContentKind::Chart
        );
        assert_eq!(kind_of(json!({"text": "hi"})), ContentKind::Markdown);
        assert_eq!(kind_of(json!({"message": "hi"})), ContentKind::Markdown);
        assert_eq!(kind_of(json!({"note": "hi"})), ContentKind::Markdown);
    }

    #[test]
    fn test_half_chart_is_not_a_chart() {
        assert_eq!(kind_of(json!({"text": "hi", "data": [1]})), ContentKind::Markdown);
        assert_eq!(kind_of(json!({"layout": {}})), ContentKind::Markdown);
    }

    #[test]
    fn test_string_kinds() {
        assert_eq!(kind_of(json!("digraph G { A -> B }")), ContentKind::Graph);
        assert_eq!(kind_of(json!("graph { a -- b }")), ContentKind::Graph);
        assert_eq!(
            kind_of(json!(r#"{"data":[{"x":[1],"y":[2]}],"layout":{"title":"t"}}"#)),
            ContentKind::Chart
        );
        assert_eq!(kind_of(json!("<table><tr><td>1</td></tr></table>")), ContentKind::Html);
        assert_eq!(kind_of(json!("# Heading\n\nSome *text*")), ContentKind::Markdown);
    }

    #[test]
    fn test_string_near_misses() {
        assert_eq!(kind_of(json!("digraph G { A -> B")), ContentKind::Markdown);
        assert_eq!(kind_of(json!("the graph {shows} a trend")), ContentKind::Markdown);
        assert_eq!(kind_of(json!(r#"{"data": [1], "layout": "#)), ContentKind::Markdown);
        assert_eq!(kind_of(json!(r#"{"data": [1], "layout": null}"#)), ContentKind::Markdown);
    }

    #[test]
    fn test_total_over_any_value() {
        for value in [
            json!(null),
            json!(42),
            json!(true),
            json!([1, 2]),
            json!({}),
            json!(""),
            json!("{ not json"),
            json!({"text": 5}),
        ] {
            assert_eq!(kind_of(value), ContentKind::Markdown);
        }
    }

    #[test]
    fn test_braces_balanced() {
        assert!(braces_balanced("a { b { c } }"));
        assert!(!braces_balanced("} {"));
        assert!(!braces_balanced("{ {"));
    }
}
