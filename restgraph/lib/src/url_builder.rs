//! Immutable builder for REST URLs.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::{ClientError, RestError, ValidationError};
use crate::json;
use crate::method::RestMethod;
use crate::response::{self, ApiResponse};
use crate::transport::{HttpRequest, RequestBody, Transport};

/// Multipart field name used for uploads.
pub const UPLOAD_FIELD: &str = "archive";

/// One point in the URL space of the service.
///
/// A builder holds the service base URL, the path segments accumulated so
/// far, and the transport used to issue requests. Appending segments
/// returns a new builder and never changes `self`, so a builder can be
/// shared freely and reused as a template for sibling resources.
///
/// Rendered URLs have the shape
/// `<base>/<prefix>[/<method>]/<segments...>/<keys...>`.
///
/// ## Examples
///
/// ```rust,ignore
/// let nsc = root.join("nsc");
/// let trunks = nsc.join("trunk");
///
/// assert_eq!(
///     trunks.render_url("api", Some("retrieve"), &["T1"]),
///     "http://nsc.local/SAFe/sng_rest/api/retrieve/nsc/trunk/T1",
/// );
/// ```
#[derive(Clone)]
pub struct UrlBuilder {
    base: Url,
    segments: Vec<String>,
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl fmt::Debug for UrlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlBuilder")
            .field("base", &self.base.as_str())
            .field("segments", &self.segments)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl UrlBuilder {
    /// Creates a root builder with no segments.
    ///
    /// `base` should end with `/` so that rendered paths are resolved below
    /// it rather than replacing its last component.
    pub fn new(base: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base,
            segments: Vec::new(),
            transport,
            timeout: None,
        }
    }

    /// Returns a copy with a request timeout applied to every request made
    /// through it and through builders derived from it.
    pub fn with_timeout(&self, timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Returns a new builder with `segments` appended.
    pub fn extend<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut extended = self.clone();
        extended.segments.extend(segments.into_iter().map(Into::into));
        extended
    }

    /// Returns a new builder with one segment appended.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        self.extend([segment.into()])
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Renders a URL without performing any request.
    ///
    /// An empty `method` is treated as absent.
    pub fn render_url(&self, prefix: &str, method: Option<&str>, keys: &[&str]) -> String {
        let path = std::iter::once(prefix)
            .chain(method.filter(|m| !m.is_empty()))
            .chain(self.segments.iter().map(String::as_str))
            .chain(keys.iter().copied())
            .collect::<Vec<_>>()
            .join("/");

        match self.base.join(&path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{path}", self.base),
        }
    }

    /// Performs a GET and interprets the response.
    ///
    /// ## Errors
    ///
    /// Returns a transport error, a status error or a content error as
    /// described by [`response::interpret`].
    pub fn get(
        &self,
        prefix: &str,
        method: Option<&str>,
        keys: &[&str],
    ) -> Result<ApiResponse, RestError> {
        let request = HttpRequest::new(RestMethod::Get, self.render_url(prefix, method, keys));
        self.send(request)
    }

    /// Performs a JSON POST and interprets the response.
    ///
    /// The JSON content type is always sent. The body is only sent when it
    /// is present and non-empty.
    ///
    /// ## Errors
    ///
    /// See [`UrlBuilder::get`].
    pub fn post(
        &self,
        prefix: &str,
        method: Option<&str>,
        keys: &[&str],
        body: Option<&Value>,
    ) -> Result<ApiResponse, RestError> {
        let payload = body
            .filter(|b| json::truthy(b))
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ValidationError::from)?;

        let request = HttpRequest::new(RestMethod::Post, self.render_url(prefix, method, keys))
            .with_body(RequestBody::Json(payload));
        self.send(request)
    }

    /// Uploads a file as the multipart field `archive`.
    ///
    /// When `payload` is absent or empty the file is read from `filename`.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::UploadRead`] if the file cannot be read, and
    /// otherwise the same errors as [`UrlBuilder::get`].
    pub fn upload(
        &self,
        prefix: &str,
        filename: impl AsRef<Path>,
        payload: Option<Vec<u8>>,
    ) -> Result<ApiResponse, RestError> {
        let filename = filename.as_ref();
        let payload = match payload.filter(|p| !p.is_empty()) {
            Some(payload) => payload,
            None => std::fs::read(filename).map_err(|source| ClientError::UploadRead {
                path: filename.to_path_buf(),
                source,
            })?,
        };

        let name = filename
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.display().to_string());

        let request = HttpRequest::new(RestMethod::Post, self.render_url(prefix, Some("upload"), &[]))
            .with_body(RequestBody::Multipart {
                field: UPLOAD_FIELD.to_string(),
                filename: name,
                payload,
            });
        self.send(request)
    }

    fn send(&self, request: HttpRequest) -> Result<ApiResponse, RestError> {
        let raw = self.transport.send(request.with_timeout(self.timeout))?;
        response::interpret(raw)
    }
}
