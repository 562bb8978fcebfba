//! Identifier naming errors.

use thiserror::Error;

/// A schema-provided name that cannot be sanitized into an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// Nothing is left of the name once spaces are removed.
    #[error("identifier is empty after sanitizing {original:?}")]
    Empty {
        /// The name as published by the schema.
        original: String,
    },

    /// The sanitized name starts with a digit.
    #[error("identifiers cannot start with a number: {name:?}")]
    LeadingDigit {
        /// The sanitized name.
        name: String,
    },

    /// The sanitized name is a reserved keyword.
    #[error("identifiers cannot be a keyword: {name:?}")]
    ReservedKeyword {
        /// The sanitized name.
        name: String,
    },
}
