//! Request body encoding and serialization to a wire payload

use serde_json::{Map, Value};

use crate::compose::key_value::KeyValueSet;
use crate::error::ComposeError;

/// Which body encoding is active
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BodyMode {
    #[default]
    None,
    Json,
    Form,
    Raw,
}

impl BodyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyMode::None => "None",
            BodyMode::Json => "JSON",
            BodyMode::Form => "Form",
            BodyMode::Raw => "Raw",
        }
    }

    pub fn next(&self) -> BodyMode {
        match self {
            BodyMode::None => BodyMode::Json,
            BodyMode::Json => BodyMode::Form,
            BodyMode::Form => BodyMode::Raw,
            BodyMode::Raw => BodyMode::None,
        }
    }
}

/// Mutually-exclusive body configuration. Inactive encodings keep their content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyModel {
    mode: BodyMode,
    pub json_text: String,
    pub form: KeyValueSet,
    pub raw_text: String,
}

pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl BodyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BodyMode) {
        self.mode = mode;
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
    }

    /// Serialize the active encoding.
    ///
    /// Raw text stays a JSON string, never parsed. Invalid JSON text is
    /// reported so the composer can fall back to an empty object.
    pub fn serialize(&self) -> Result<Value, ComposeError> {
        match self.mode {
            BodyMode::None => Ok(empty_object()),
            BodyMode::Json => {
                let text = self.json_text.trim();
                if text.is_empty() {
                    return Ok(empty_object());
                }
                serde_json::from_str(text).map_err(|e| ComposeError::MalformedBody(e.to_string()))
            }
            BodyMode::Form => {
                let map: Map<String, Value> = self
                    .form
                    .project()
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
                Ok(Value::Object(map))
            }
            BodyMode::Raw => Ok(Value::String(self.raw_text.clone())),
        }
    }

    /// Hydrate from a stored body: objects open in the JSON editor, strings as raw text
    pub fn from_value(value: &Value) -> Self {
        let mut model = Self::new();
        match value {
            Value::Object(map) if !map.is_empty() => {
                model.mode = BodyMode::Json;
                model.json_text =
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            }
            Value::String(text) => {
                model.mode = BodyMode::Raw;
                model.raw_text = text.clone();
            }
            _ => {}
        }
        model
    }
}
