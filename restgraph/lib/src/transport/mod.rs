//! The HTTP seam between URL builders and the network.
//!
//! [`UrlBuilder`](crate::UrlBuilder) renders URLs and bodies into an
//! [`HttpRequest`] and hands it to a [`Transport`]. The transport returns a
//! [`RawResponse`] which is then interpreted by
//! [`response::interpret`](crate::response::interpret). Transports never look
//! at status codes; every HTTP response, successful or not, is returned as a
//! [`RawResponse`].

mod blocking;

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::ClientError;
use crate::method::RestMethod;

pub use blocking::{ReqwestTransport, ReqwestTransportBuilder, API_KEY_HEADER};

/// Media type for JSON bodies.
pub const JSON_MIMETYPE: &str = "application/json";

/// Media type for binary archive payloads.
pub const GZIP_MIMETYPE: &str = "application/x-gzip";

/// Sends one HTTP request and waits for the complete response.
///
/// Implementations must be safe to share between threads; the compiled proxy
/// graph holds a single transport for all of its builders.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Performs the request.
    ///
    /// ## Errors
    ///
    /// Returns a [`ClientError`] only for transport failures (refused
    /// connection, timeout, TLS). HTTP error statuses are returned as
    /// ordinary responses.
    fn send(&self, request: HttpRequest) -> Result<RawResponse, ClientError>;
}

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No body and no content type.
    Empty,
    /// JSON content type, with the serialized payload if there is one.
    Json(Option<Vec<u8>>),
    /// A single multipart file field.
    Multipart {
        /// Form field name.
        field: String,
        /// File name reported for the part.
        filename: String,
        /// File contents.
        payload: Vec<u8>,
    },
}

/// A fully rendered request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP verb.
    pub method: RestMethod,
    /// Absolute URL.
    pub url: String,
    /// Request body.
    pub body: RequestBody,
    /// Per-request timeout, if any.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a bodiless request.
    pub fn new(method: RestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The JSON payload, if the body is JSON and non-empty.
    pub fn json(&self) -> Option<Value> {
        match &self.body {
            RequestBody::Json(Some(bytes)) => serde_json::from_slice(bytes).ok(),
            _ => None,
        }
    }
}

/// An HTTP response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub reason: String,
    /// The URL the response came from.
    pub url: String,
    /// Value of the `Content-Type` header.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

impl RawResponse {
    /// Creates an empty response with the canonical reason phrase for
    /// `status`.
    pub fn new(status: u16, url: impl Into<String>) -> Self {
        Self {
            status,
            reason: canonical_reason(status),
            url: url.into(),
            content_type: None,
            body: Bytes::new(),
        }
    }

    /// Creates a JSON response.
    pub fn json(status: u16, url: impl Into<String>, body: &Value) -> Self {
        Self::new(status, url)
            .with_content_type(JSON_MIMETYPE)
            .with_body(body.to_string())
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The media type without parameters, lowercased.
    ///
    /// `application/json; charset=utf-8` becomes `application/json`.
    pub fn mimetype(&self) -> Option<String> {
        let content_type = self.content_type.as_deref()?;
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        (!essence.is_empty()).then_some(essence)
    }

    /// Returns `true` if the content type is JSON.
    pub fn is_json(&self) -> bool {
        self.mimetype().as_deref() == Some(JSON_MIMETYPE)
    }
}

pub(crate) fn canonical_reason(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}
