use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Truthiness as the agent's upstream clients judge it: `null`, `false`, `0`
/// and `""` are absent, every array and object is present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Look up `key` on an object, keeping it only when it is truthy.
pub fn present<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| is_truthy(v))
}

/// Like [`present`], for fields that must be non-empty strings.
pub fn present_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    present(value, key).and_then(Value::as_str)
}

/// Decode JSON carried inside a string field.
///
/// A failure only means this one field is unavailable, so it is logged and
/// reported as `None` instead of being returned to the caller.
pub fn parse_embedded_json(raw: &str, what: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse {}: {}", what, e);
            None
        }
    }
}

/// Accept a field that is either JSON-encoded text or an already decoded value.
pub fn decode_embedded(value: &Value, what: &str) -> Option<Value> {
    match value {
        Value::String(raw) => parse_embedded_json(raw, what),
        other => Some(other.clone()),
    }
}

/// Keyword arguments looked up with a quoted value.
const QUOTED_KEYWORDS: [&str; 8] = [
    "title",
    "x",
    "y",
    "xaxis_title",
    "yaxis_title",
    "color",
    "color_continuous_scale",
    "marker_color",
];
/// Keyword arguments looked up as bare expressions.
const EXPR_KEYWORDS: [&str; 2] = ["x", "y"];

lazy_static! {
    static ref QUOTED_ARGS: HashMap<&'static str, Regex> = QUOTED_KEYWORDS
        .iter()
        .map(|key| (*key, keyword_regex(key, r#"['"]([^'"]+)['"]"#)))
        .collect();
    static ref EXPR_ARGS: HashMap<&'static str, Regex> = EXPR_KEYWORDS
        .iter()
        .map(|key| (*key, keyword_regex(key, r"([^,)\s]+)")))
        .collect();
}

fn keyword_regex(key: &str, value: &str) -> Regex {
    Regex::new(&format!(r"\b{}\s*=\s*{}", regex::escape(key), value)).unwrap()
}

/// Find a quoted keyword argument (`key="value"` or `key='value'`) anywhere in
/// `code`. Matches whole words only, so `title` never matches `xaxis_title`.
/// Only the keywords the chart matchers read are recognised.
pub fn keyword_arg<'a>(code: &'a str, key: &str) -> Option<&'a str> {
    capture(QUOTED_ARGS.get(key)?, code)
}

/// Find an unquoted keyword argument (`key=some.expression`) in `code`.
pub fn keyword_expr<'a>(code: &'a str, key: &str) -> Option<&'a str> {
    capture(EXPR_ARGS.get(key)?, code)
}

fn capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("a")));
        assert!(is_truthy(&json!(1.5)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_present_str() {
        let value = json!({"text": "hi", "empty": "", "number": 3});
        assert_eq!(present_str(&value, "text"), Some("hi"));
        assert_eq!(present_str(&value, "empty"), None);
        assert_eq!(present_str(&value, "number"), None);
        assert_eq!(present_str(&value, "missing"), None);
    }

    #[test]
    fn test_parse_embedded_json() {
        assert_eq!(parse_embedded_json(r#"{"a": 1}"#, "test"), Some(json!({"a": 1})));
        assert_eq!(parse_embedded_json("not json {", "test"), None);
    }

    #[test]
    fn test_decode_embedded() {
        assert_eq!(decode_embedded(&json!("[1, 2]"), "test"), Some(json!([1, 2])));
        assert_eq!(decode_embedded(&json!([1, 2]), "test"), Some(json!([1, 2])));
        assert_eq!(decode_embedded(&json!("[1, 2"), "test"), None);
    }

    #[test]
    fn test_keyword_arg_whole_word() {
        let code = r#"fig.update_layout(xaxis_title="Age", title='Ages')"#;
        assert_eq!(keyword_arg(code, "title"), Some("Ages"));
        assert_eq!(keyword_arg(code, "xaxis_title"), Some("Age"));
        assert_eq!(keyword_arg(code, "yaxis_title"), None);

        let code = r#"df = pd.DataFrame(index='i'); px.bar(df, x='age')"#;
        assert_eq!(keyword_arg(code, "x"), Some("age"));
    }

    #[test]
    fn test_keyword_expr() {
        let params = "x=counts.index, y=counts.values, marker_color='teal'";
        assert_eq!(keyword_expr(params, "x"), Some("counts.index"));
        assert_eq!(keyword_expr(params, "y"), Some("counts.values"));
        assert_eq!(keyword_expr(params, "z"), None);
    }

    #[test]
    fn test_keyword_patterns_are_compiled_once() {
        assert_eq!(QUOTED_ARGS.len(), QUOTED_KEYWORDS.len());
        assert_eq!(EXPR_ARGS.len(), EXPR_KEYWORDS.len());
        assert_eq!(keyword_arg("title='a'", "subtitle"), None);
        assert_eq!(
            keyword_arg("px.bar(df, color_continuous_scale='Plasma', color='g')", "color"),
            Some("g")
        );
    }
}
