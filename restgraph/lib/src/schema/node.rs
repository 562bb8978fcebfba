//! Schema nodes with role markers.

use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::json;
use crate::method::RestMethod;

/// Marker types for the role a node plays in the schema.
pub mod kind {
    /// A resource (module, singleton or collection).
    #[derive(Debug)]
    pub struct Object;
    /// A callable operation.
    #[derive(Debug)]
    pub struct Method;
    /// A property descriptor.
    #[derive(Debug)]
    pub struct Class;
}

/// A resource node.
pub type ObjectNode = Node<kind::Object>;
/// A method node.
pub type MethodNode = Node<kind::Method>;
/// A property node.
pub type ClassNode = Node<kind::Class>;

/// One entry of the schema tree.
///
/// `path` is the sequence of tags from the root down to this node and is the
/// only thing used to build URLs. The remaining schema fields are opaque and
/// kept for documentation.
#[derive(Debug)]
pub struct Node<K> {
    tag: String,
    path: Vec<String>,
    spec: Map<String, Value>,
    objects: Vec<ObjectNode>,
    classes: Vec<ClassNode>,
    methods: Vec<MethodNode>,
    _kind: PhantomData<K>,
}

// Manual Clone implementation - PhantomData<K> is always Clone
impl<K> Clone for Node<K> {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            path: self.path.clone(),
            spec: self.spec.clone(),
            objects: self.objects.clone(),
            classes: self.classes.clone(),
            methods: self.methods.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> Node<K> {
    pub(crate) fn new(
        tag: String,
        path: Vec<String>,
        spec: Map<String, Value>,
        objects: Vec<ObjectNode>,
        classes: Vec<ClassNode>,
        methods: Vec<MethodNode>,
    ) -> Self {
        Self {
            tag,
            path,
            spec,
            objects,
            classes,
            methods,
            _kind: PhantomData,
        }
    }

    /// The raw name of the node as published by the remote service.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Tags from the schema root down to and including this node.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The path joined with dots, for diagnostics.
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    /// Looks up an arbitrary schema field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.spec.get(field)
    }

    /// All schema fields other than the three child sections.
    pub fn spec(&self) -> &Map<String, Value> {
        &self.spec
    }

    /// The display name (`name` field), if any.
    pub fn name(&self) -> Option<String> {
        self.spec.get("name").filter(|v| !v.is_null()).map(json::text)
    }

    /// The `description` field as documentation text.
    pub fn description(&self) -> Option<String> {
        json::doc_string(self.spec.get("description"))
    }

    /// Nested resources (`object` section).
    pub fn objects(&self) -> &[ObjectNode] {
        &self.objects
    }

    /// Property descriptors (`class` section).
    pub fn classes(&self) -> &[ClassNode] {
        &self.classes
    }

    /// Callable operations (`methods` section).
    pub fn methods(&self) -> &[MethodNode] {
        &self.methods
    }
}

impl ObjectNode {
    /// Whether the resource is addressed without a key.
    ///
    /// Root-level resources (modules) are always singletons, whatever their
    /// `singleton` flag says. Deeper nodes follow the flag, which defaults to
    /// `false`.
    pub fn is_singleton(&self) -> bool {
        if self.path.len() == 1 {
            return true;
        }
        self.spec.get("singleton").is_some_and(json::truthy)
    }

    /// Returns `true` if the resource exposes both `retrieve` and `update`.
    pub fn is_record(&self) -> bool {
        let has = |tag: &str| self.methods.iter().any(|m| m.tag() == tag);
        has("retrieve") && has("update")
    }
}

impl MethodNode {
    /// The HTTP verb declared in the `request` field.
    ///
    /// ## Errors
    ///
    /// Returns [`SchemaError::MissingVerb`] when the field is absent and
    /// [`SchemaError::UnsupportedVerb`] for anything but GET or POST.
    pub fn request(&self) -> Result<RestMethod, SchemaError> {
        let verb = self
            .spec
            .get("request")
            .filter(|v| !v.is_null())
            .map(json::text)
            .ok_or_else(|| SchemaError::MissingVerb {
                path: self.dotted_path(),
            })?;

        verb.parse().map_err(|_| SchemaError::UnsupportedVerb {
            path: self.dotted_path(),
            verb,
        })
    }
}

impl ClassNode {
    /// The help text of the property.
    pub fn help(&self) -> Option<String> {
        json::doc_string(self.spec.get("help"))
    }
}
