//! HTTP client and status errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::response::Reason;

/// Errors from the transport layer and from non-success HTTP statuses.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport failed (timeout, refused connection, TLS). Surfaced
    /// exactly as the HTTP library reported it.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A transport failure reported by a non-reqwest transport.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A 4xx response whose body could not be normalized into a message.
    #[error("{status} Client Error: {reason} for url: {url}")]
    ClientStatus {
        /// The HTTP status code returned.
        status: u16,
        /// The reason phrase for the status.
        reason: String,
        /// The URL that was requested.
        url: String,
    },

    /// A 5xx response.
    #[error("{status} Server Error: {reason} for url: {url}")]
    ServerStatus {
        /// The HTTP status code returned.
        status: u16,
        /// The reason phrase for the status.
        reason: String,
        /// The URL that was requested.
        url: String,
    },

    /// A 4xx response carrying a JSON error payload, normalized into a
    /// single message.
    #[error("{message}")]
    Api {
        /// The HTTP status code returned.
        status: u16,
        /// The URL that was requested.
        url: String,
        /// The normalized error message.
        message: String,
        /// Structured commit failure reasons, when the service sent any.
        reasons: Vec<Reason>,
    },

    /// The payload for an upload could not be read from disk.
    #[error("failed to read upload payload '{}': {source}", .path.display())]
    UploadRead {
        /// The file that was being read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Returns `true` if this is a normalized API error.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Returns the HTTP status code if this error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ClientStatus { status, .. }
            | Self::ServerStatus { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Connection(_) | Self::UploadRead { .. } => None,
        }
    }

    /// Returns the commit failure reasons of an API error.
    pub fn reasons(&self) -> &[Reason] {
        match self {
            Self::Api { reasons, .. } => reasons.as_slice(),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_status_display() {
        let err = ClientError::ClientStatus {
            status: 404,
            reason: "Not Found".to_string(),
            url: "http://nsc:80/SAFe/sng_rest/api/retrieve/nsc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "404 Client Error: Not Found for url: http://nsc:80/SAFe/sng_rest/api/retrieve/nsc"
        );
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn test_server_status_display() {
        let err = ClientError::ServerStatus {
            status: 503,
            reason: "Service Unavailable".to_string(),
            url: "http://nsc/doc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "503 Server Error: Service Unavailable for url: http://nsc/doc"
        );
    }

    #[test]
    fn test_connection_has_no_status() {
        let err = ClientError::Connection("connection refused".to_string());
        assert_eq!(err.status_code(), None);
        assert!(!err.is_api_error());
    }

    #[test]
    fn test_upload_read_display() {
        let err = ClientError::UploadRead {
            path: PathBuf::from("/tmp/missing.tgz"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("/tmp/missing.tgz"));
    }
}
