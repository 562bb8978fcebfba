//! Errors from using the compiled proxy graph.

use thiserror::Error;

/// Misuse of a compiled proxy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// The proxy has no member with this name.
    #[error("'{owner}' has no member '{name}'")]
    UnknownMember {
        /// Type name of the proxy.
        owner: String,
        /// The requested member.
        name: String,
    },

    /// Indexing was attempted on a singleton resource.
    #[error("'{owner}' is not a collection and cannot be indexed")]
    NotIndexable {
        /// Type name of the proxy.
        owner: String,
    },

    /// A method was called with the wrong number of arguments.
    #[error("{member}() takes {expected} argument(s) but {got} were given")]
    Arity {
        /// The method name.
        member: String,
        /// Human readable expected count.
        expected: &'static str,
        /// Number of arguments supplied.
        got: usize,
    },

    /// An argument has the wrong JSON type.
    #[error("invalid argument to {member}(): {reason}")]
    InvalidArgument {
        /// The method name.
        member: String,
        /// What was wrong.
        reason: String,
    },

    /// A property's field is absent from the retrieved record.
    #[error("'{owner}' record has no field '{field}'")]
    MissingField {
        /// Type name of the proxy.
        owner: String,
        /// The field tag.
        field: String,
    },
}
