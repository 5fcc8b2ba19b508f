//! Response classification - turns a `ResponseRecord` into something drawable

use serde_json::Value;
use thiserror::Error;

use crate::models::ResponseRecord;

/// Status code band, used for coloring the status badge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusBand {
    Success,
    Redirect,
    ClientError,
    ServerError,
    Neutral,
}

impl StatusBand {
    pub fn from_code(code: Option<i64>) -> StatusBand {
        match code {
            Some(200..=299) => StatusBand::Success,
            Some(300..=399) => StatusBand::Redirect,
            Some(400..=499) => StatusBand::ClientError,
            Some(c) if c >= 500 => StatusBand::ServerError,
            _ => StatusBand::Neutral,
        }
    }
}

/// How a value should be displayed
#[derive(Clone, Debug, PartialEq)]
pub enum RenderPlan {
    /// Object or array, handed to a tree renderer
    Tree(Value),
    /// Shown verbatim
    Text(String),
}

impl RenderPlan {
    pub fn for_value(value: &Value) -> RenderPlan {
        match value {
            Value::Object(_) | Value::Array(_) => RenderPlan::Tree(value.clone()),
            Value::String(s) => RenderPlan::Text(s.clone()),
            Value::Null => RenderPlan::Text(String::new()),
            other => RenderPlan::Text(other.to_string()),
        }
    }
}

/// Everything the display layer needs about one response
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseView {
    pub band: StatusBand,
    pub status_label: String,
    pub elapsed_label: String,
    pub headers: RenderPlan,
    pub body: RenderPlan,
}

/// Classify a record. Pure: the same record always yields the same view.
pub fn classify(record: &ResponseRecord) -> ResponseView {
    let elapsed = record.elapsed_ms.unwrap_or(0.0).round();
    ResponseView {
        band: StatusBand::from_code(record.status_code),
        status_label: record
            .status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string()),
        elapsed_label: format!("{} ms", elapsed as i64),
        headers: RenderPlan::for_value(&record.headers),
        body: RenderPlan::for_value(&record.body),
    }
}

#[derive(Debug, Error)]
#[error("tree render failed: {0}")]
pub struct RenderError(pub String);

/// Interchangeable renderer for structured values
pub trait TreeRenderer {
    fn render(&self, value: &Value) -> Result<String, RenderError>;
}

/// Two-space pretty printed JSON
pub struct PrettyText;

impl TreeRenderer for PrettyText {
    fn render(&self, value: &Value) -> Result<String, RenderError> {
        serde_json::to_string_pretty(value).map_err(|e| RenderError(e.to_string()))
    }
}

/// Render a plan to text, falling back to pretty JSON when the renderer is
/// absent or fails.
pub fn render_plan(plan: &RenderPlan, renderer: Option<&dyn TreeRenderer>) -> String {
    match plan {
        RenderPlan::Text(text) => text.clone(),
        RenderPlan::Tree(value) => {
            if let Some(renderer) = renderer {
                match renderer.render(value) {
                    Ok(rendered) => return rendered,
                    Err(err) => tracing::debug!(error = %err, "Falling back to plain JSON"),
                }
            }
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}
