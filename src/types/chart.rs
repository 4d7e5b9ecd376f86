//! Renderer-agnostic chart description reconstructed from agent output.
//!
//! Field names serialise in the Plotly JSON shape so that a renderer can take
//! `data`/`layout` as they are.
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TITLE: &str = "Chart";
pub const DEFAULT_X_AXIS_TITLE: &str = "X Axis";
pub const DEFAULT_Y_AXIS_TITLE: &str = "Y Axis";
pub const DEFAULT_COLOR_SCALE: &str = "Turbo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "data")]
    pub series: Vec<ChartSeries>,
    pub layout: ChartLayout,
}

impl ChartSpec {
    pub fn new(series: Vec<ChartSeries>, layout: ChartLayout) -> Self {
        Self { series, layout }
    }

    /// Split into the `(data, layout)` JSON pair carried by normalized content.
    pub fn into_parts(self) -> (Value, Value) {
        (
            serde_json::to_value(self.series).unwrap_or(Value::Null),
            serde_json::to_value(self.layout).unwrap_or(Value::Null),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    #[serde(rename = "type")]
    pub chart_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

impl ChartSeries {
    pub fn bar(x: Vec<Value>, y: Vec<Value>) -> Self {
        Self {
            x,
            y,
            chart_type: "bar".to_string(),
            mode: None,
            marker: None,
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Either a single colour name or one value per point.
    pub color: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
}

impl Marker {
    pub fn solid<S: Into<String>>(color: S) -> Self {
        Self {
            color: Value::String(color.into()),
            colorscale: None,
            showscale: None,
        }
    }

    pub fn scaled<S: Into<String>>(values: Vec<Value>, colorscale: S, showscale: bool) -> Self {
        Self {
            color: Value::Array(values),
            colorscale: Some(colorscale.into()),
            showscale: Some(showscale),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub t: u32,
    pub r: u32,
    pub b: u32,
    pub l: u32,
}

impl Margin {
    pub fn new(t: u32, r: u32, b: u32, l: u32) -> Self {
        Self { t, r, b, l }
    }

    pub fn uniform(size: u32) -> Self {
        Self::new(size, size, size, size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub title: String,
    #[serde(rename = "xaxis")]
    pub x_axis: Axis,
    #[serde(rename = "yaxis")]
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}

impl ChartLayout {
    /// Build a layout, substituting the documented defaults for missing titles.
    pub fn titled(
        title: Option<&str>,
        x_axis_title: Option<&str>,
        y_axis_title: Option<&str>,
    ) -> Self {
        Self {
            title: title.unwrap_or(DEFAULT_TITLE).to_string(),
            x_axis: Axis {
                title: x_axis_title.unwrap_or(DEFAULT_X_AXIS_TITLE).to_string(),
            },
            y_axis: Axis {
                title: y_axis_title.unwrap_or(DEFAULT_Y_AXIS_TITLE).to_string(),
            },
            template: None,
            margin: None,
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn with_template<S: Into<String>>(mut self, template: S) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn x_axis_title(&self) -> &str {
        &self.x_axis.title
    }

    pub fn y_axis_title(&self) -> &str {
        &self.y_axis.title
    }
}
