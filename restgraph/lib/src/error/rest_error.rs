//! Top-level error type.

use super::{ClientError, ConfigError, NamingError, ProxyError, SchemaError, ValidationError};
use crate::response::Reason;
use thiserror::Error;

/// Top-level error type for all REST graph operations.
///
/// Every error is raised at the call site that triggered it. Nothing is
/// retried and nothing is logged on the way out; presenting the error is the
/// caller's job.
///
/// ## Examples
///
/// ```rust,ignore
/// use restgraph_lib::RestError;
///
/// match trunks.retrieve("T1") {
///     Ok(record) => println!("{record}"),
///     Err(RestError::Client(e)) if e.is_api_error() => eprintln!("rejected: {e}"),
///     Err(other) => eprintln!("failed: {other}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum RestError {
    /// Transport failures and HTTP error statuses.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A successful response that could not be interpreted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A schema-provided name could not be turned into an identifier.
    #[error(transparent)]
    Naming(#[from] NamingError),

    /// The schema tree has an unexpected shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Connection configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Misuse of the compiled proxy graph.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl RestError {
    /// Returns `true` if the remote service rejected the call with a JSON
    /// error payload.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_api_error())
    }

    /// Returns the HTTP status code for status-derived errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Client(e) => e.status_code(),
            _ => None,
        }
    }

    /// Returns the commit failure reasons attached to an API error.
    pub fn reasons(&self) -> &[Reason] {
        match self {
            Self::Client(e) => e.reasons(),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_client_error() {
        let err: RestError = ClientError::Connection("refused".to_string()).into();
        assert!(matches!(err, RestError::Client(_)));
        assert!(!err.is_api_error());
    }

    #[test]
    fn test_api_error_is_transparent() {
        let err: RestError = ClientError::Api {
            status: 409,
            url: "http://nsc/api/create/trunk/T1".to_string(),
            message: "The key 'T1' is in conflict with the system".to_string(),
            reasons: vec![],
        }
        .into();
        assert!(err.is_api_error());
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(
            err.to_string(),
            "The key 'T1' is in conflict with the system"
        );
    }

    #[test]
    fn test_naming_error_has_no_status() {
        let err: RestError = NamingError::LeadingDigit {
            name: "9lives".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), None);
        assert!(err.reasons().is_empty());
    }
}
