//! Client compiler for self-describing REST services.
//!
//! The remote service publishes a JSON schema of its resources, properties
//! and methods at `<root>/doc`. This crate fetches that schema and compiles it
//! into a graph of proxies that translate member access into HTTP calls.
//!
//! ## Core Types
//!
//! - [`Schema`] - Typed view of the published schema ([`ObjectNode`],
//!   [`MethodNode`], [`ClassNode`])
//! - [`UrlBuilder`] - Immutable builder for request URLs
//! - [`ApiResponse`] - An interpreted successful response
//! - [`Proxy`] - A compiled node: [`ChildProxy`] or [`CollectionProxy`]
//!
//! ## Connecting
//!
//! - [`connect`] - Fetch, compile and return the root proxy
//! - [`ClientBuilder`] - Port, scheme, API key, timeout and schema file
//!   settings
//!
//! ## Transport
//!
//! - [`Transport`] - The blocking HTTP seam
//! - [`ReqwestTransport`] - Production transport over `reqwest`
//! - [`testing::MockTransport`] - In-memory transport for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use restgraph_lib::connect;
//! use serde_json::json;
//!
//! let root = connect("nsc.example.com", 80, "http")?;
//! let trunks = root.walk(&["nsc", "trunk"])?;
//!
//! let trunk = trunks.invoke("create", &[json!("T1"), json!({"enabled": true})])?;
//! let active = trunks.invoke("list", &[json!({"status": "active"})])?;
//! ```

mod client;
pub mod error;
mod ident;
mod json;
pub mod method;
pub mod proxy;
pub mod response;
pub mod schema;
pub mod testing;
pub mod transport;
mod url_builder;

pub use client::{connect, Client, ClientBuilder, DEFAULT_API_ROOT, DEFAULT_PORT, DEFAULT_SCHEME};
pub use error::{
    ClientError, ConfigError, NamingError, ProxyError, RestError, SchemaError, ValidationError,
};
pub use ident::{is_keyword, Ident, FALLBACK_IDENT};
pub use method::RestMethod;
pub use proxy::{
    BoundMethod, CallOutput, ChildProxy, CollectionProxy, MemberInfo, MemberKind, MethodKind,
    Property, Proxy,
};
pub use response::{ApiResponse, Reason, ResponseContent};
pub use schema::{ClassNode, MethodNode, Node, ObjectNode, Schema};
pub use transport::{HttpRequest, RawResponse, ReqwestTransport, RequestBody, Transport};
pub use url_builder::{UrlBuilder, UPLOAD_FIELD};
