//! The compiled proxy graph.
//!
//! Compiling a [`Schema`](crate::Schema) produces a tree of [`Proxy`] values.
//! A [`ChildProxy`] stands for one addressable resource and exposes
//! properties, nested objects and methods. A [`CollectionProxy`] stands for
//! a keyed set of resources; indexing it with a key compiles a fresh
//! [`ChildProxy`] bound to that instance's URL.
//!
//! Members are resolved by name at runtime through a small registry
//! interface:
//!
//! | Operation       | Child                          | Collection                 |
//! |-----------------|--------------------------------|----------------------------|
//! | `invoke`        | generic GET/POST, `list`       | plus `create`, `retrieve`, `update`, `delete` |
//! | `object`        | nested resource by tag         | n/a                        |
//! | `index`         | n/a                            | instance by key            |
//! | `get_property`  | `retrieve()[field]`            | n/a                        |
//! | `set_property`  | `update({field: value})`       | n/a                        |
//!
//! Every call performs at most the HTTP requests its operation describes;
//! the graph itself holds no mutable state.

mod args;
mod child;
mod collection;
mod compiler;
mod method;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

pub use child::{ChildProxy, Property};
pub use collection::CollectionProxy;
pub use compiler::{
    compile_child, compile_collection, compile_methods, compile_object, compile_objects,
    compile_properties, compile_root,
};
pub use method::{BoundMethod, MethodKind};

use crate::error::{ProxyError, RestError};

/// A compiled schema node.
#[derive(Debug, Clone)]
pub enum Proxy {
    /// A singleton resource.
    Child(ChildProxy),
    /// A keyed collection of resources.
    Collection(CollectionProxy),
}

impl Proxy {
    /// The sanitized type name of the node.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Child(child) => child.type_name(),
            Self::Collection(collection) => collection.type_name(),
        }
    }

    /// Documentation copied from the schema description.
    pub fn doc(&self) -> Option<&str> {
        match self {
            Self::Child(child) => child.doc(),
            Self::Collection(collection) => collection.doc(),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    pub fn as_child(&self) -> Option<&ChildProxy> {
        match self {
            Self::Child(child) => Some(child),
            Self::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionProxy> {
        match self {
            Self::Collection(collection) => Some(collection),
            Self::Child(_) => None,
        }
    }

    /// Calls a method by name.
    ///
    /// ## Errors
    ///
    /// See [`ChildProxy::invoke`] and [`CollectionProxy::invoke`].
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<CallOutput, RestError> {
        match self {
            Self::Child(child) => child.invoke(name, args),
            Self::Collection(collection) => collection.invoke(name, args),
        }
    }

    /// Lists the members available on this node.
    pub fn members(&self) -> Vec<MemberInfo> {
        match self {
            Self::Child(child) => child.members(),
            Self::Collection(collection) => collection.members(),
        }
    }

    /// Display form of the node, fetched from `retrieve` or `list`.
    ///
    /// ## Errors
    ///
    /// Returns the error of the underlying request.
    pub fn repr(&self) -> Result<String, RestError> {
        match self {
            Self::Child(child) => child.repr(),
            Self::Collection(collection) => collection.repr(),
        }
    }

    /// Follows a path of object tags and collection keys.
    ///
    /// On a child each segment names a nested object; on a collection it is
    /// a key. Walking performs no requests.
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError::UnknownMember`] for an unknown object tag.
    pub fn walk<S: AsRef<str>>(&self, path: &[S]) -> Result<Proxy, RestError> {
        let mut current = self.clone();
        for segment in path {
            current = match &current {
                Self::Child(child) => child.object(segment.as_ref())?.clone(),
                Self::Collection(collection) => Self::Child(collection.index(segment.as_ref())?),
            };
        }
        Ok(current)
    }

    /// Indexes a collection.
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError::NotIndexable`] on a child.
    pub fn index(&self, key: &str) -> Result<ChildProxy, RestError> {
        match self {
            Self::Collection(collection) => collection.index(key),
            Self::Child(child) => Err(ProxyError::NotIndexable {
                owner: child.type_name().to_string(),
            }
            .into()),
        }
    }
}

impl From<ChildProxy> for Proxy {
    fn from(child: ChildProxy) -> Self {
        Self::Child(child)
    }
}

impl From<CollectionProxy> for Proxy {
    fn from(collection: CollectionProxy) -> Self {
        Self::Collection(collection)
    }
}

/// Result of invoking a method.
#[derive(Debug, Clone)]
pub enum CallOutput {
    /// Unpacked response data.
    Data(Value),
    /// A newly addressable instance (from `create`).
    Instance(Box<ChildProxy>),
    /// The method returns nothing.
    Unit,
}

impl CallOutput {
    /// The returned data, if any.
    pub fn into_data(self) -> Option<Value> {
        match self {
            Self::Data(value) => Some(value),
            Self::Instance(_) | Self::Unit => None,
        }
    }

    /// The returned instance, if any.
    pub fn into_instance(self) -> Option<ChildProxy> {
        match self {
            Self::Instance(child) => Some(*child),
            Self::Data(_) | Self::Unit => None,
        }
    }
}

/// The role of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Property,
    Object,
    Collection,
    Method,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Property => "property",
            Self::Object => "object",
            Self::Collection => "collection",
            Self::Method => "method",
        };
        f.write_str(label)
    }
}

/// Description of one member of a proxy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberInfo {
    /// The name the member is reached by.
    pub name: String,
    pub kind: MemberKind,
    /// Method behavior, for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodKind>,
    /// Documentation from the schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}
