//! Layered error types for the REST graph crate.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`RestError`] - Top-level error type returned by every fallible operation
//! - [`ClientError`] - Transport failures and non-success HTTP statuses
//! - [`ValidationError`] - Responses that cannot be interpreted
//! - [`NamingError`] - Schema names that cannot become identifiers
//! - [`SchemaError`] - Structural problems in the published schema
//! - [`ConfigError`] - Connection configuration problems
//! - [`ProxyError`] - Misuse of the compiled proxy graph

mod client_error;
mod config_error;
mod naming_error;
mod proxy_error;
mod rest_error;
mod schema_error;
mod validation_error;

pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use naming_error::NamingError;
pub use proxy_error::ProxyError;
pub use rest_error::RestError;
pub use schema_error::SchemaError;
pub use validation_error::ValidationError;
