//! Interpreted response values.

use bytes::Bytes;
use serde_json::Value;

use crate::json;

/// Parsed content of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseContent {
    /// An `application/json` document.
    Json(Value),
    /// An `application/x-gzip` payload, passed through untouched.
    Binary(Bytes),
}

/// A successful, interpreted response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    mimetype: String,
    content: ResponseContent,
}

impl ApiResponse {
    pub(crate) fn new(mimetype: impl Into<String>, content: ResponseContent) -> Self {
        Self {
            mimetype: mimetype.into(),
            content,
        }
    }

    /// The media type the content was interpreted as.
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// The parsed content.
    pub fn content(&self) -> &ResponseContent {
        &self.content
    }

    /// The `data` field of a JSON envelope.
    ///
    /// Returns `None` for binary content or when the field is absent.
    pub fn data(&self) -> Option<&Value> {
        match &self.content {
            ResponseContent::Json(value) => value.get("data"),
            ResponseContent::Binary(_) => None,
        }
    }

    /// Consumes the response and returns its `data` field, or `null`.
    pub fn into_data(self) -> Value {
        match self.content {
            ResponseContent::Json(Value::Object(mut envelope)) => {
                envelope.remove("data").unwrap_or(Value::Null)
            }
            _ => Value::Null,
        }
    }

    /// Consumes the response and returns the whole JSON document, or `null`
    /// for binary content.
    pub fn into_json(self) -> Value {
        match self.content {
            ResponseContent::Json(value) => value,
            ResponseContent::Binary(_) => Value::Null,
        }
    }

    /// Health indicator.
    ///
    /// For JSON this is the truthiness of the `status` field. Binary content
    /// is healthy when non-empty.
    pub fn status(&self) -> bool {
        match &self.content {
            ResponseContent::Json(value) => value.get("status").is_some_and(json::truthy),
            ResponseContent::Binary(bytes) => !bytes.is_empty(),
        }
    }

    /// The raw payload of binary content.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.content {
            ResponseContent::Binary(bytes) => Some(bytes),
            ResponseContent::Json(_) => None,
        }
    }
}
