//! Typed, read-only view over the published API schema.
//!
//! The remote service describes itself as a tree of named nodes. Every node
//! may carry three child sections: `object` (nested resources), `class`
//! (properties) and `methods` (callable operations). [`Schema`] turns that
//! tree into [`ObjectNode`]s, [`ClassNode`]s and [`MethodNode`]s; everything
//! else in a node is kept verbatim and reachable through [`Node::get`].

mod node;
mod parser;

pub use node::{kind, ClassNode, MethodNode, Node, ObjectNode};
pub use parser::Schema;
