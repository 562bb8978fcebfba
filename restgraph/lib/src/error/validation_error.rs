//! Response interpretation errors.

use thiserror::Error;

/// Errors raised while interpreting a successful response.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The response content type is neither JSON nor gzip.
    #[error("Unsupported content type: '{mimetype}'")]
    UnsupportedContentType {
        /// The offending content type, as sent by the server.
        mimetype: String,
    },

    /// A JSON body could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValidationError {
    /// Returns `true` if this is a content type error.
    pub fn is_unsupported_content_type(&self) -> bool {
        matches!(self, Self::UnsupportedContentType { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_content_type_names_mimetype() {
        let err = ValidationError::UnsupportedContentType {
            mimetype: "text/html".to_string(),
        };
        assert!(err.is_unsupported_content_type());
        assert_eq!(err.to_string(), "Unsupported content type: 'text/html'");
    }

    #[test]
    fn test_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = ValidationError::Json(json_err);
        assert!(!err.is_unsupported_content_type());
        assert!(err.to_string().starts_with("JSON error"));
    }
}
