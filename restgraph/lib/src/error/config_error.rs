//! Connection configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors in connection configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL built from scheme, host, port and API root is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A default header name or value is invalid.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the problem.
        message: String,
    },

    /// A local file (schema or documentation dump) could not be accessed.
    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err = ConfigError::InvalidUrl(url_err);
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_invalid_header() {
        let err = ConfigError::invalid_header("invalid header name: bad name");
        assert_eq!(err.to_string(), "Invalid header: invalid header name: bad name");
    }
}
