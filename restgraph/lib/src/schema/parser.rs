//! Conversion of the raw schema document into typed nodes.

use std::path::Path;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::node::{ClassNode, MethodNode, Node, ObjectNode};
use crate::error::{ConfigError, RestError, SchemaError};
use crate::json;

/// The parsed schema: one [`ObjectNode`] per top-level module.
#[derive(Debug, Clone)]
pub struct Schema {
    roots: Vec<ObjectNode>,
}

impl Schema {
    /// Builds the node tree from the JSON returned by the `doc` endpoint.
    ///
    /// Key order of the document is preserved.
    ///
    /// ## Errors
    ///
    /// Returns a [`SchemaError`] if the root, a node, or a child section is
    /// not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let modules = match value {
            Value::Object(modules) => modules,
            other => {
                return Err(SchemaError::RootNotObject {
                    found: json::type_name(&other),
                });
            }
        };

        let roots = modules
            .into_iter()
            .map(|(tag, spec)| parse_node(tag, spec, &[]))
            .collect::<Result<Vec<ObjectNode>, _>>()?;

        Ok(Self { roots })
    }

    /// Reads a schema previously saved to disk.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or a
    /// [`SchemaError`] if its content is not a valid schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(content.parse()?)
    }

    /// The top-level modules.
    pub fn roots(&self) -> &[ObjectNode] {
        &self.roots
    }

    /// Finds a resource node by its tag path.
    pub fn find(&self, path: &[&str]) -> Option<&ObjectNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.iter().find(|n| n.tag() == *first)?;
        for tag in rest {
            node = node.objects().iter().find(|n| n.tag() == *tag)?;
        }
        Some(node)
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_value(serde_json::from_str(s)?)
    }
}

fn parse_node<K>(tag: String, spec: Value, parent: &[String]) -> Result<Node<K>, SchemaError> {
    let mut path = parent.to_vec();
    path.push(tag.clone());

    let mut spec = match spec {
        Value::Object(spec) => spec,
        other => {
            return Err(SchemaError::NodeNotObject {
                path: path.join("."),
                found: json::type_name(&other),
            });
        }
    };

    let objects: Vec<ObjectNode> = parse_section(&mut spec, "object", &path)?;
    let classes: Vec<ClassNode> = parse_section(&mut spec, "class", &path)?;
    let methods: Vec<MethodNode> = parse_section(&mut spec, "methods", &path)?;

    Ok(Node::new(tag, path, spec, objects, classes, methods))
}

/// Removes a child section from `spec` and parses its entries.
///
/// A missing or empty section yields no children.
fn parse_section<K>(
    spec: &mut Map<String, Value>,
    section: &'static str,
    path: &[String],
) -> Result<Vec<Node<K>>, SchemaError> {
    let Some(subspec) = spec.remove(section) else {
        return Ok(Vec::new());
    };
    if !json::truthy(&subspec) {
        return Ok(Vec::new());
    }

    let entries = match subspec {
        Value::Object(entries) => entries,
        other => {
            return Err(SchemaError::SectionNotObject {
                path: path.join("."),
                section,
                found: json::type_name(&other),
            });
        }
    };

    entries
        .into_iter()
        .map(|(tag, child)| parse_node(tag, child, path))
        .collect()
}
