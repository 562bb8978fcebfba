//! Blocking transport over `reqwest`.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tracing::{instrument, Span};

use super::{canonical_reason, HttpRequest, RawResponse, RequestBody, Transport, JSON_MIMETYPE};
use crate::error::{ClientError, ConfigError};

/// Header carrying the static API credential.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Builder for a [`ReqwestTransport`].
#[derive(Debug, Default)]
pub struct ReqwestTransportBuilder {
    default_headers: HeaderMap,
}

impl ReqwestTransportBuilder {
    /// Adds a header sent with every request.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ConfigError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| ConfigError::invalid_header(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| ConfigError::invalid_header(format!("invalid header value: {e}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sends `api_key` in the `X-API-KEY` header of every request.
    ///
    /// ## Errors
    ///
    /// Returns an error if the key is not a valid header value.
    pub fn api_key(self, api_key: impl AsRef<str>) -> Result<Self, ConfigError> {
        self.default_header(API_KEY_HEADER, api_key)
    }

    /// Builds the transport.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ReqwestTransport, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .default_headers(self.default_headers)
            .timeout(None)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(ReqwestTransport { client })
    }
}

/// Production [`Transport`] backed by a blocking `reqwest` client.
///
/// The underlying client keeps a connection pool, so one transport should be
/// shared by the whole proxy graph.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Creates a builder.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Creates a transport with no default headers.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }
}

impl Transport for ReqwestTransport {
    #[instrument(
        name = "rest_request",
        skip(self, request),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    fn send(&self, request: HttpRequest) -> Result<RawResponse, ClientError> {
        Span::current().record("http.method", request.method.to_string().as_str());
        Span::current().record("http.url", request.url.as_str());

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.url.as_str());

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(payload) => {
                let builder = builder.header(CONTENT_TYPE, JSON_MIMETYPE);
                match payload {
                    Some(bytes) => builder.body(bytes),
                    None => builder,
                }
            }
            RequestBody::Multipart {
                field,
                filename,
                payload,
            } => {
                let part = Part::bytes(payload).file_name(filename);
                builder.multipart(Form::new().part(field, part))
            }
        };

        let response = builder.send()?;

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        let otel_status = if status.is_server_error() {
            "ERROR"
        } else if status.is_client_error() {
            "UNSET"
        } else {
            "OK"
        };
        Span::current().record("otel.status_code", otel_status);

        let url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes()?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: canonical_reason(status.as_u16()),
            url,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Runs a request on a blocking thread; `reqwest::blocking` must not be
    /// driven from inside the test runtime.
    async fn send(
        transport: ReqwestTransportBuilder,
        request: HttpRequest,
    ) -> Result<RawResponse, ClientError> {
        tokio::task::spawn_blocking(move || transport.build()?.send(request))
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_returns_raw_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/SAFe/sng_rest/doc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"nsc": {}})))
            .mount(&mock_server)
            .await;

        let url = format!("{}/SAFe/sng_rest/doc", mock_server.uri());
        let response = send(
            ReqwestTransport::builder(),
            HttpRequest::new(RestMethod::Get, url.clone()),
        )
        .await
        .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.reason, "OK");
        assert_eq!(response.url, url);
        assert!(response.is_json());
        assert_eq!(response.body.as_ref(), br#"{"nsc":{}}"#);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_status_is_not_a_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let response = send(
            ReqwestTransport::builder(),
            HttpRequest::new(RestMethod::Get, mock_server.uri()),
        )
        .await
        .unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.reason, "Service Unavailable");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/update/trunk/T1"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"enabled": true})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = HttpRequest::new(
            RestMethod::Post,
            format!("{}/api/update/trunk/T1", mock_server.uri()),
        )
        .with_body(RequestBody::Json(Some(br#"{"enabled":true}"#.to_vec())));

        let response = send(ReqwestTransport::builder(), request).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_api_key_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::builder().api_key("secret").unwrap();
        let response = send(transport, HttpRequest::new(RestMethod::Get, mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_multipart_upload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = HttpRequest::new(RestMethod::Post, format!("{}/api/upload", mock_server.uri()))
            .with_body(RequestBody::Multipart {
                field: "archive".to_string(),
                filename: "backup.tar.gz".to_string(),
                payload: b"archive-bytes".to_vec(),
            });
        send(ReqwestTransport::builder(), request).await.unwrap();

        let received = mock_server.received_requests().await.unwrap();
        let content_type = received[0].headers.get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains("name=\"archive\""));
        assert!(body.contains("filename=\"backup.tar.gz\""));
        assert!(body.contains("archive-bytes"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_timeout_is_a_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let request = HttpRequest::new(RestMethod::Get, mock_server.uri())
            .with_timeout(Some(Duration::from_millis(100)));
        let err = send(ReqwestTransport::builder(), request).await.unwrap_err();

        match err {
            ClientError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_header_name() {
        let err = ReqwestTransport::builder()
            .default_header("bad header", "value")
            .unwrap_err();
        assert!(err.to_string().contains("invalid header name"));
    }
}
