//! Reconstruct a chart from Python plotting code without running it.
//!
//! This is pattern extraction, not parsing: an ordered list of matchers is
//! tried against the code string and the first one that recognises the code
//! wins. Code that no matcher recognises simply yields no chart.
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::types::chart::{ChartLayout, ChartSeries, ChartSpec, Marker, Margin, DEFAULT_COLOR_SCALE};
use crate::utils::{keyword_arg, keyword_expr, parse_embedded_json};

const FREQUENCY_TRANSFORM: &str = "value_counts()";
const SORT_TRANSFORM: &str = "sort_index()";
const DEFAULT_MARKER_COLOR: &str = "mediumvioletred";
const RECORDS_COLOR_SCALE: &str = "Viridis";

lazy_static! {
    /// `name = [1, 2, 3]`, possibly cut short as `name = [1, 2, ...]`.
    static ref NUMERIC_LIST: Regex =
        Regex::new(r"(\w+)\s*=\s*\[(\s*[0-9][0-9\s,]*(?:\.\.\.|…)?\s*)\]").unwrap();
    /// `data = [{...}, {...}]`, also under names such as `sales_data`.
    static ref RECORDS_LIST: Regex = Regex::new(r"\w*data\s*=\s*(\[[\s\S]*?\])").unwrap();
    /// `px.bar(...)` and friends.
    static ref DECLARATIVE_CALL: Regex =
        Regex::new(r"px\.(scatter|bar|line|histogram)\(([^)]*)\)").unwrap();
    /// `go.Figure(data=[go.Bar(...)])` and friends.
    static ref IMPERATIVE_FIGURE: Regex =
        Regex::new(r"(?s)go\.Figure\(\s*data\s*=\s*\[\s*go\.(Bar|Scatter|Line)\((.*?)\)\s*\]").unwrap();
}

type Matcher = fn(&str) -> Option<ChartSpec>;

/// Tried in order; the first match wins.
const MATCHERS: [(&str, Matcher); 3] = [
    ("declarative frequency", declarative_frequency),
    ("imperative frequency", imperative_frequency),
    ("declarative records", declarative_records),
];

/// Reconstruct a [`ChartSpec`] from plotting code, or `None` when its data
/// literal is truncated or the code is not in a recognised shape.
pub fn extract_chart(code: &str) -> Option<ChartSpec> {
    MATCHERS.iter().find_map(|(name, matcher)| {
        let spec = matcher(code)?;
        debug!("Reconstructed chart with the {} matcher", name);
        Some(spec)
    })
}

/// `px.*` call counting the values of a numeric list.
fn declarative_frequency(code: &str) -> Option<ChartSpec> {
    if !DECLARATIVE_CALL.is_match(code) || !code.contains(FREQUENCY_TRANSFORM) {
        return None;
    }
    let (x, counts) = frequency_distribution(&numeric_list(code)?);

    let colorscale = keyword_arg(code, "color_continuous_scale").unwrap_or(DEFAULT_COLOR_SCALE);
    let marker = Marker::scaled(counts.clone(), colorscale, false);

    Some(ChartSpec::new(
        vec![ChartSeries::bar(x, counts).with_marker(marker)],
        layout_from_keywords(code).with_margin(Margin::new(60, 40, 60, 60)),
    ))
}

/// `go.Figure(data=[go.Bar(x=.., y=..)])` over a sorted value count.
fn imperative_frequency(code: &str) -> Option<ChartSpec> {
    let figure = IMPERATIVE_FIGURE.captures(code)?;
    let params = figure.get(2)?.as_str();
    keyword_expr(params, "x")?;
    keyword_expr(params, "y")?;
    if !code.contains(FREQUENCY_TRANSFORM) || !code.contains(SORT_TRANSFORM) {
        return None;
    }
    let (x, counts) = frequency_distribution(&numeric_list(code)?);

    let color = keyword_arg(code, "marker_color").unwrap_or(DEFAULT_MARKER_COLOR);

    Some(ChartSpec::new(
        vec![ChartSeries::bar(x, counts).with_marker(Marker::solid(color))],
        layout_from_keywords(code)
            .with_template("plotly_white")
            .with_margin(Margin::new(60, 40, 60, 60)),
    ))
}

/// `px.*` call over a literal list of records.
fn declarative_records(code: &str) -> Option<ChartSpec> {
    let call = DECLARATIVE_CALL.captures(code)?;
    let plot = call.get(1)?.as_str();
    let literal = RECORDS_LIST.captures(code)?.get(1)?.as_str();
    if is_truncated(literal) {
        return None;
    }

    let records = match parse_embedded_json(&literal.replace('\'', "\""), "chart data literal")? {
        Value::Array(records) if !records.is_empty() => records,
        _ => return None,
    };

    let x_field = keyword_arg(code, "x").unwrap_or("x");
    let y_field = keyword_arg(code, "y").unwrap_or("y");
    let x = field_values(&records, x_field)?;
    let y = field_values(&records, y_field)?;

    let (chart_type, mode) = match plot {
        "scatter" => ("scatter", Some("markers")),
        "line" => ("scatter", Some("lines")),
        other => (other, None),
    };
    let marker = keyword_arg(code, "color").and_then(|field| {
        field_values(&records, field)
            .map(|colors| Marker::scaled(colors, RECORDS_COLOR_SCALE, true))
    });

    let series = ChartSeries {
        x,
        y,
        chart_type: chart_type.to_string(),
        mode: mode.map(str::to_string),
        marker,
    };
    Some(ChartSpec::new(
        vec![series],
        layout_from_keywords(code).with_margin(Margin::uniform(40)),
    ))
}

fn layout_from_keywords(code: &str) -> ChartLayout {
    ChartLayout::titled(
        keyword_arg(code, "title"),
        keyword_arg(code, "xaxis_title").or_else(|| keyword_arg(code, "x")),
        keyword_arg(code, "yaxis_title").or_else(|| keyword_arg(code, "y")),
    )
}

/// An ellipsis inside a data literal means the agent elided values.
fn is_truncated(literal: &str) -> bool {
    let truncated = literal.contains("...") || literal.contains('…');
    if truncated {
        warn!("Data appears to be truncated in chart code, skipping extraction");
    }
    truncated
}

/// Integers of the first numeric list literal in the code.
fn numeric_list(code: &str) -> Option<Vec<i64>> {
    let body = NUMERIC_LIST.captures(code)?.get(2)?.as_str();
    if is_truncated(body) {
        return None;
    }
    let values: Vec<i64> = body
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| item.parse().ok())
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Sorted unique values and how often each occurs.
fn frequency_distribution(values: &[i64]) -> (Vec<Value>, Vec<Value>) {
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(*value).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| (Value::from(value), Value::from(count)))
        .unzip()
}

/// One value per record; every record must be an object carrying the field.
fn field_values(records: &[Value], field: &str) -> Option<Vec<Value>> {
    records
        .iter()
        .map(|record| record.as_object()?.get(field).cloned())
        .collect()
}
