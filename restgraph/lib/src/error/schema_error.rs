//! Schema structure errors.

use thiserror::Error;

/// Structural problems found while reading the published schema.
///
/// Only the shape the compiler relies on is checked; schema content is
/// otherwise passed through untouched.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The top level of the schema is not an object of named modules.
    #[error("schema root must be an object, found {found}")]
    RootNotObject {
        /// The JSON type that was found.
        found: &'static str,
    },

    /// A node specification is not an object.
    #[error("schema node '{path}' must be an object, found {found}")]
    NodeNotObject {
        /// Dotted path of the node.
        path: String,
        /// The JSON type that was found.
        found: &'static str,
    },

    /// A child section (`object`, `class`, `methods`) is not an object.
    #[error("section '{section}' of schema node '{path}' must be an object, found {found}")]
    SectionNotObject {
        /// Dotted path of the owning node.
        path: String,
        /// The section name.
        section: &'static str,
        /// The JSON type that was found.
        found: &'static str,
    },

    /// A method without a `request` verb.
    #[error("method '{path}' does not declare a request verb")]
    MissingVerb {
        /// Dotted path of the method.
        path: String,
    },

    /// A method whose `request` verb is not GET or POST.
    #[error("method '{path}' declares unsupported request verb '{verb}'")]
    UnsupportedVerb {
        /// Dotted path of the method.
        path: String,
        /// The declared verb.
        verb: String,
    },
}
