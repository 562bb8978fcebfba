//! Normalization of JSON error payloads.
//!
//! The remote service reports errors in several inconsistent shapes. Each
//! shape is parsed into its own [`ErrorShape`] variant and rendered by a
//! dedicated rule; there is no attempt at a single schema for the `error`
//! field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json;

/// One entry of a commit failure `reason` list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Reason {
    /// Name of the offending object.
    #[serde(rename = "obj_name")]
    pub name: Option<String>,
    /// Type of the offending object.
    pub obj_type: String,
    /// Human readable failure.
    pub description: String,
    /// Module that rejected the change.
    pub module: String,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}

/// Shapes of the `error` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorShape {
    /// `"error": "message"`
    Text(String),
    /// `"error": ["line", "line"]`
    Lines(Vec<String>),
    /// `"error": {"message": "..."}`
    Message(String),
    /// `"error": {"msg": "...", "obj": [{"obj_type": .., "obj_name": ..}]}`
    InUse {
        /// Type of the object holding the reference.
        obj_type: String,
        /// Name of the object holding the reference.
        obj_name: String,
    },
    /// `"error": {"path": {"to": "message"}}`
    PathTree(Map<String, Value>),
}

impl ErrorShape {
    fn parse(error: &Value) -> Option<Self> {
        match error {
            Value::String(message) => Some(Self::Text(message.clone())),
            Value::Array(lines) => Some(Self::Lines(lines.iter().map(json::text).collect())),
            Value::Object(fields) => Some(Self::parse_object(fields)),
            _ => None,
        }
    }

    fn parse_object(fields: &Map<String, Value>) -> Self {
        if let Some(message) = fields.get("message").filter(|v| json::truthy(v)) {
            return Self::Message(json::text(message));
        }

        let Some(msg) = fields.get("msg").filter(|v| json::truthy(v)) else {
            return Self::PathTree(fields.clone());
        };

        match fields.get("obj").and_then(|obj| obj.get(0)) {
            Some(obj) => {
                let field = |name: &str| obj.get(name).map(json::text).unwrap_or_default();
                Self::InUse {
                    obj_type: field("obj_type"),
                    obj_name: field("obj_name"),
                }
            }
            None => Self::Message(json::text(msg)),
        }
    }

    /// Renders the shape as a message.
    pub fn message(&self) -> String {
        match self {
            Self::Text(message) | Self::Message(message) => message.clone(),
            Self::Lines(lines) => lines.join("\n"),
            Self::InUse { obj_type, obj_name } => format!("In use by {obj_type} '{obj_name}'"),
            Self::PathTree(tree) => flatten_error(tree).join("\n"),
        }
    }
}

/// A 4xx JSON error body.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// The whole body is a string and is the message.
    Bare(String),
    /// An envelope with an `error` field.
    Wrapped {
        /// Shape of the `error` field.
        shape: ErrorShape,
        /// The key the error refers to, from the `name` field.
        name: Option<String>,
        /// Commit failure reasons attached to an object `error`.
        reasons: Vec<Reason>,
    },
}

impl ErrorBody {
    /// Parses an error body.
    ///
    /// Returns `None` for shapes that cannot be normalized; the caller then
    /// falls back to the generic status message.
    pub fn parse(body: &Value) -> Option<Self> {
        if let Value::String(message) = body {
            return Some(Self::Bare(message.clone()));
        }

        let error = body.get("error")?;
        let shape = ErrorShape::parse(error)?;
        let name = body
            .get("name")
            .filter(|v| json::truthy(v))
            .map(json::text);
        let reasons = error
            .get("reason")
            .and_then(|r| serde_json::from_value::<Vec<Reason>>(r.clone()).ok())
            .unwrap_or_default();

        Some(Self::Wrapped {
            shape,
            name,
            reasons,
        })
    }

    /// The final error message.
    pub fn message(&self) -> String {
        match self {
            Self::Bare(message) => message.clone(),
            Self::Wrapped { shape, name, .. } => {
                let message = shape.message();
                match name {
                    Some(name) if message == "Conflict" => {
                        format!("The key '{name}' is in conflict with the system")
                    }
                    Some(name) => format!("Error for {name}: {message}"),
                    None => message,
                }
            }
        }
    }

    /// Commit failure reasons, if any.
    pub fn reasons(&self) -> &[Reason] {
        match self {
            Self::Bare(_) => &[],
            Self::Wrapped { reasons, .. } => reasons.as_slice(),
        }
    }

    /// Consumes the body, returning the message and reasons.
    pub fn into_parts(self) -> (String, Vec<Reason>) {
        let message = self.message();
        match self {
            Self::Bare(_) => (message, Vec::new()),
            Self::Wrapped { reasons, .. } => (message, reasons),
        }
    }
}

/// Flattens a nested path-to-message tree into `path: message` lines.
///
/// Nested keys are joined with `/`. Falsy leaves read `unknown error`.
pub fn flatten_error(tree: &Map<String, Value>) -> Vec<String> {
    let mut lines = Vec::new();
    flatten_into(tree, "", &mut lines);
    lines
}

fn flatten_into(tree: &Map<String, Value>, parent: &str, lines: &mut Vec<String>) {
    for (key, value) in tree {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}/{key}")
        };

        match value {
            Value::Object(nested) => flatten_into(nested, &path, lines),
            leaf if json::truthy(leaf) => lines.push(format!("{path}: {}", json::text(leaf))),
            _ => lines.push(format!("{path}: unknown error")),
        }
    }
}
