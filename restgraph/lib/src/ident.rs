//! Identifier sanitization for schema-provided names.
//!
//! Type names, property names and method names all come from the remote
//! schema. Before they are exposed they are cleaned up:
//!
//! 1. Spaces are removed.
//! 2. Every character outside `[A-Za-z0-9_]` becomes `_`.
//! 3. The result must be non-empty, must not start with a digit and must
//!    not be a Rust keyword.
//!
//! A missing (or empty) name maps to [`FALLBACK_IDENT`] instead of failing.

use std::fmt;

use crate::error::NamingError;

/// Identifier used when the schema does not provide a name.
pub const FALLBACK_IDENT: &str = "RestObject";

/// Strict and reserved keywords of the 2024 edition.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// A sanitized identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    /// Sanitizes a schema name into an identifier.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use restgraph_lib::Ident;
    ///
    /// assert_eq!(Ident::sanitize(Some("Trunk-Group")).unwrap().as_str(), "Trunk_Group");
    /// assert_eq!(Ident::sanitize(None).unwrap().as_str(), "RestObject");
    /// assert!(Ident::sanitize(Some("3way")).is_err());
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns a [`NamingError`] if the sanitized name is empty, starts with
    /// a digit, or is a reserved keyword.
    pub fn sanitize(name: Option<&str>) -> Result<Self, NamingError> {
        let original = match name {
            None | Some("") => return Ok(Self::fallback()),
            Some(name) => name,
        };

        let sanitized: String = original
            .chars()
            .filter(|c| *c != ' ')
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();

        match sanitized.chars().next() {
            None => {
                return Err(NamingError::Empty {
                    original: original.to_string(),
                });
            }
            Some(c) if c.is_ascii_digit() => {
                return Err(NamingError::LeadingDigit { name: sanitized });
            }
            Some(_) => {}
        }

        if is_keyword(&sanitized) {
            return Err(NamingError::ReservedKeyword { name: sanitized });
        }

        Ok(Self(sanitized))
    }

    /// The placeholder used for unnamed nodes.
    pub fn fallback() -> Self {
        Self(FALLBACK_IDENT.to_string())
    }

    /// Returns a string slice reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` if `word` is a reserved keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Ident> for String {
    fn from(ident: Ident) -> Self {
        ident.0
    }
}

impl TryFrom<&str> for Ident {
    type Error = NamingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::sanitize(Some(value))
    }
}
