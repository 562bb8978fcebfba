//! Connection setup and the `connect` entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::error::{ConfigError, RestError, ValidationError};
use crate::ident::{Ident, FALLBACK_IDENT};
use crate::json;
use crate::proxy::{compile_root, ChildProxy};
use crate::schema::Schema;
use crate::transport::{ReqwestTransport, Transport};
use crate::url_builder::UrlBuilder;

/// Default service port.
pub const DEFAULT_PORT: u16 = 80;

/// Default URL scheme.
pub const DEFAULT_SCHEME: &str = "http";

/// Default path of the REST root on the service.
pub const DEFAULT_API_ROOT: &str = "SAFe/sng_rest";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for configuring a [`Client`].
///
/// ## Examples
///
/// ```rust,ignore
/// use restgraph_lib::ClientBuilder;
///
/// let root = ClientBuilder::new("nsc.example.com")
///     .port(8443)
///     .scheme("https")
///     .api_key("secret")
///     .connect()?;
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    host: String,
    port: u16,
    scheme: String,
    api_root: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
    headers: Vec<(String, String)>,
    schema_file: Option<PathBuf>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a builder for `host` with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            scheme: DEFAULT_SCHEME.to_string(),
            api_root: DEFAULT_API_ROOT.to_string(),
            api_key: None,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            headers: Vec::new(),
            schema_file: None,
            transport: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the REST root path below the host.
    pub fn api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    /// Sends `api_key` in the `X-API-KEY` header of every request.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the timeout applied to every request. `None` disables it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Reads the schema from a file instead of the service's `doc`
    /// endpoint.
    pub fn schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_file = Some(path.into());
        self
    }

    /// Uses `transport` instead of a `reqwest` client. Headers and the API
    /// key are then the transport's responsibility.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The REST root: `scheme://host:port/api_root/`.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the parts do not form a URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let api_root = self.api_root.trim_matches('/');
        let path = if api_root.is_empty() {
            String::new()
        } else {
            format!("{api_root}/")
        };
        Ok(Url::parse(&format!(
            "{}://{}:{}/{path}",
            self.scheme, self.host, self.port
        ))?)
    }

    /// Builds the [`Client`].
    ///
    /// ## Errors
    ///
    /// Returns an error for an invalid URL or header, or if the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<Client, RestError> {
        let base = self.base_url()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = ReqwestTransport::builder();
                for (name, value) in &self.headers {
                    builder = builder.default_header(name, value)?;
                }
                if let Some(api_key) = &self.api_key {
                    builder = builder.api_key(api_key)?;
                }
                Arc::new(builder.build()?)
            }
        };

        Ok(Client {
            host: self.host,
            builder: UrlBuilder::new(base, transport).with_timeout(self.timeout),
            schema_file: self.schema_file,
        })
    }

    /// Builds the client, loads the schema and compiles the root proxy.
    ///
    /// ## Errors
    ///
    /// See [`ClientBuilder::build`] and [`Client::connect`].
    pub fn connect(self) -> Result<ChildProxy, RestError> {
        self.build()?.connect()
    }
}

/// A configured connection to one service.
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    builder: UrlBuilder,
    schema_file: Option<PathBuf>,
}

impl Client {
    /// Creates a builder.
    pub fn builder(host: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(host)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The root URL builder.
    pub fn url_builder(&self) -> &UrlBuilder {
        &self.builder
    }

    /// Fetches the raw schema document from the `doc` endpoint.
    ///
    /// ## Errors
    ///
    /// Returns the request error.
    pub fn fetch_schema(&self) -> Result<Value, RestError> {
        info!(url = %self.builder.render_url("doc", None, &[]), "Fetching API schema");
        Ok(self.builder.get("doc", None, &[])?.into_json())
    }

    /// Loads the schema from the configured file, or fetches it.
    ///
    /// ## Errors
    ///
    /// Returns an I/O, request or schema error.
    pub fn load_schema(&self) -> Result<Schema, RestError> {
        match &self.schema_file {
            Some(path) => {
                info!(path = %path.display(), "Loading API schema from file");
                Schema::load(path)
            }
            None => Ok(Schema::from_value(self.fetch_schema()?)?),
        }
    }

    /// Type name of the root proxy: the host's first label, capitalized.
    ///
    /// Hosts whose label is not a usable identifier (an IP address, say)
    /// fall back to `RestObject`.
    pub fn root_type_name(&self) -> Ident {
        let label = self.host.split('.').next().unwrap_or_default();
        let mut chars = label.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        };

        Ident::sanitize(Some(&capitalized)).unwrap_or_else(|err| {
            warn!(host = %self.host, error = %err, "Host label is not an identifier, using {FALLBACK_IDENT}");
            Ident::fallback()
        })
    }

    /// Compiles `schema` into the root proxy.
    ///
    /// ## Errors
    ///
    /// Returns the first naming or schema error.
    pub fn compile(&self, schema: &Schema) -> Result<ChildProxy, RestError> {
        compile_root(self.root_type_name(), schema, &self.builder)
    }

    /// Loads the schema and compiles the root proxy.
    ///
    /// ## Errors
    ///
    /// See [`Client::load_schema`] and [`Client::compile`].
    pub fn connect(&self) -> Result<ChildProxy, RestError> {
        let schema = self.load_schema()?;
        self.compile(&schema)
    }

    /// Writes the raw schema to `path` with sorted keys and four-space
    /// indentation.
    ///
    /// ## Errors
    ///
    /// Returns the request error or [`ConfigError::Io`] if the file cannot
    /// be written.
    pub fn dump_docs(&self, path: impl AsRef<Path>) -> Result<(), RestError> {
        let path = path.as_ref();
        let schema = json::sorted(&self.fetch_schema()?);

        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        schema
            .serialize(&mut serializer)
            .map_err(ValidationError::from)?;

        std::fs::write(path, out).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Wrote API schema");
        Ok(())
    }
}

/// Connects to `host` and returns the root proxy.
///
/// Shorthand for [`ClientBuilder`] with the given port and scheme and all
/// other settings at their defaults.
///
/// ## Errors
///
/// See [`ClientBuilder::connect`].
pub fn connect(host: &str, port: u16, scheme: &str) -> Result<ChildProxy, RestError> {
    ClientBuilder::new(host).port(port).scheme(scheme).connect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;
    use crate::testing::MockTransport;
    use serde_json::json;

    fn client(host: &str, transport: Arc<MockTransport>) -> Client {
        ClientBuilder::new(host).transport(transport).build().unwrap()
    }

    #[test]
    fn test_base_url() {
        let builder = ClientBuilder::new("nsc.local").port(8080);
        assert_eq!(
            builder.base_url().unwrap().as_str(),
            "http://nsc.local:8080/SAFe/sng_rest/"
        );

        let builder = ClientBuilder::new("nsc.local").scheme("https").api_root("/rest/");
        assert_eq!(builder.base_url().unwrap().as_str(), "https://nsc.local:80/rest/");
    }

    #[test]
    fn test_invalid_host() {
        let err = ClientBuilder::new("bad host").base_url().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_root_type_name() {
        let transport = Arc::new(MockTransport::new());
        assert_eq!(client("nsc.example.com", transport.clone()).root_type_name().as_str(), "Nsc");
        assert_eq!(client("SBC-1.lab", transport.clone()).root_type_name().as_str(), "Sbc_1");
        assert_eq!(client("10.0.0.1", transport).root_type_name().as_str(), "RestObject");
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_root_type_name_fallback_warns() {
        let transport = Arc::new(MockTransport::new());
        client("192.168.1.20", transport).root_type_name();
        assert!(logs_contain("Host label is not an identifier"));
    }

    #[test]
    fn test_connect_fetches_doc_once() {
        let transport = Arc::new(MockTransport::new());
        let doc = "http://nsc:80/SAFe/sng_rest/doc";
        let doc = Url::parse(doc).unwrap().to_string();
        transport.on(
            RestMethod::Get,
            doc.clone(),
            crate::transport::RawResponse::json(200, doc.clone(), &json!({"nsc": {"name": "NSC"}})),
        );

        let root = client("nsc", transport.clone()).connect().unwrap();
        assert_eq!(root.type_name(), "Nsc");
        assert_eq!(root.object("nsc").unwrap().type_name(), "NSC");
        assert_eq!(transport.count(RestMethod::Get, &doc), 1);
    }

    #[test]
    fn test_schema_file_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, r#"{"nsc": {}}"#).unwrap();

        let transport = Arc::new(MockTransport::new());
        let root = ClientBuilder::new("nsc")
            .schema_file(&path)
            .transport(transport.clone())
            .connect()
            .unwrap();

        assert!(root.object("nsc").is_ok());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_dump_docs_sorted_and_indented() {
        let transport = Arc::new(MockTransport::new());
        let doc = Url::parse("http://nsc:80/SAFe/sng_rest/doc").unwrap().to_string();
        transport.on(
            RestMethod::Get,
            doc.clone(),
            crate::transport::RawResponse::json(200, doc, &json!({"b": 1, "a": {"d": 2, "c": 3}})),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        client("nsc", transport).dump_docs(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n    \"a\": {\n        \"c\": 3,\n        \"d\": 2\n    },\n    \"b\": 1\n}"
        );
    }

    #[test]
    fn test_timeout_applies_to_requests() {
        let transport = Arc::new(MockTransport::new());
        let client = ClientBuilder::new("nsc")
            .timeout(Some(Duration::from_secs(7)))
            .transport(transport.clone())
            .build()
            .unwrap();

        let _ = client.fetch_schema();
        assert_eq!(transport.requests()[0].timeout, Some(Duration::from_secs(7)));
    }
}
