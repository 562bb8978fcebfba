//! Proxies for keyed collections of resources.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::child::ChildProxy;
use super::compiler::compile_child;
use super::method::{BoundMethod, MethodKind, API_PREFIX};
use super::{args, CallOutput, MemberInfo};
use crate::error::{ProxyError, RestError};
use crate::ident::Ident;
use crate::json;
use crate::response::ApiResponse;
use crate::schema::ObjectNode;
use crate::url_builder::UrlBuilder;

/// An indexable set of resource instances.
///
/// Indexing with a key compiles a fresh [`ChildProxy`] rooted at that
/// instance's URL. The collection keeps its schema subtree for this purpose.
#[derive(Debug, Clone)]
pub struct CollectionProxy {
    pub(crate) type_name: Ident,
    pub(crate) doc: Option<String>,
    pub(crate) builder: UrlBuilder,
    pub(crate) node: Arc<ObjectNode>,
    pub(crate) methods: BTreeMap<String, BoundMethod>,
}

impl CollectionProxy {
    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn builder(&self) -> &UrlBuilder {
        &self.builder
    }

    pub fn method(&self, name: &str) -> Option<&BoundMethod> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Addresses one instance. Performs no request.
    ///
    /// ## Errors
    ///
    /// Returns a naming error if the instance schema cannot be compiled.
    pub fn index(&self, key: &str) -> Result<ChildProxy, RestError> {
        compile_child(&self.node, self.builder.join(key))
    }

    /// Calls a method by name with JSON arguments.
    ///
    /// | Method     | Arguments        | Returns                     |
    /// |------------|------------------|-----------------------------|
    /// | `list`     | `[filter]`       | listing or matching keys    |
    /// | `create`   | `key, [data]`    | [`CallOutput::Instance`]    |
    /// | `retrieve` | `key`            | record                      |
    /// | `update`   | `key, data`      | nothing                     |
    /// | `delete`   | `key`            | nothing                     |
    ///
    /// Other methods behave as on a [`ChildProxy`].
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError`]s for unknown methods and bad arguments, and the
    /// request error otherwise.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<CallOutput, RestError> {
        let method = self.methods.get(name).ok_or_else(|| self.unknown(name))?;
        let member = method.name();

        match method.kind() {
            MethodKind::List => {
                args::arity(member, args, 0, 1)?;
                let filter = args::filter(member, args.first())?;
                Ok(CallOutput::Data(self.list(filter)?))
            }
            MethodKind::Create => {
                args::arity(member, args, 1, 2)?;
                let key = args::key(member, &args[0])?;
                let instance = self.create(&key, args.get(1))?;
                Ok(CallOutput::Instance(Box::new(instance)))
            }
            MethodKind::Retrieve => {
                args::arity(member, args, 1, 1)?;
                Ok(CallOutput::Data(self.retrieve(&args::key(member, &args[0])?)?))
            }
            MethodKind::Update => {
                args::arity(member, args, 2, 2)?;
                self.update(&args::key(member, &args[0])?, &args[1])?;
                Ok(CallOutput::Unit)
            }
            MethodKind::Delete => {
                args::arity(member, args, 1, 1)?;
                self.delete(&args::key(member, &args[0])?)?;
                Ok(CallOutput::Unit)
            }
            MethodKind::Get | MethodKind::Post => method.call_generic(args),
        }
    }

    /// Lists the collection.
    ///
    /// Without a filter the listing is returned as sent. With a filter, every
    /// listed key is retrieved through its instance proxy and only keys whose
    /// record has each filter field with an equal value are returned. This is
    /// one request per entry.
    ///
    /// ## Errors
    ///
    /// Returns the first request error.
    pub fn list(&self, filter: Option<&Map<String, Value>>) -> Result<Value, RestError> {
        let method = self.require(MethodKind::List)?;
        let listing = method.get(&[])?.into_data();

        let Some(filter) = filter else {
            return Ok(listing);
        };

        let keys = listing_keys(&listing);
        debug!(
            collection = self.type_name(),
            entries = keys.len(),
            "Filtering listing by retrieving every entry"
        );

        let mut matches = Vec::new();
        for key in keys {
            let record = self.index(&key)?.retrieve()?;
            if record_matches(&record, filter) {
                matches.push(Value::String(key));
            }
        }
        Ok(Value::Array(matches))
    }

    /// Creates an instance and returns its proxy without fetching it.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `create` request.
    pub fn create(&self, key: &str, data: Option<&Value>) -> Result<ChildProxy, RestError> {
        self.require(MethodKind::Create)?.post(&[key], data)?;
        self.index(key)
    }

    /// Retrieves one record.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `retrieve` request.
    pub fn retrieve(&self, key: &str) -> Result<Value, RestError> {
        Ok(self.require(MethodKind::Retrieve)?.get(&[key])?.into_data())
    }

    /// Updates one record.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `update` request.
    pub fn update(&self, key: &str, data: &Value) -> Result<(), RestError> {
        self.require(MethodKind::Update)?.post(&[key], Some(data))?;
        Ok(())
    }

    /// Deletes one record.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `delete` request.
    pub fn delete(&self, key: &str) -> Result<(), RestError> {
        self.require(MethodKind::Delete)?.post(&[key], None)?;
        Ok(())
    }

    /// The unfiltered listing as keys.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `list` request.
    pub fn keys(&self) -> Result<Vec<String>, RestError> {
        Ok(listing_keys(&self.list(None)?))
    }

    /// Whether `key` is in the unfiltered listing.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `list` request.
    pub fn contains(&self, key: &str) -> Result<bool, RestError> {
        Ok(self.keys()?.iter().any(|k| k == key))
    }

    /// Performs a declared GET method and returns the raw response.
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError::InvalidArgument`] if the method is not a GET.
    pub fn fetch(&self, name: &str) -> Result<ApiResponse, RestError> {
        let method = self.methods.get(name).ok_or_else(|| self.unknown(name))?;
        if !matches!(method.kind(), MethodKind::Get | MethodKind::List) {
            return Err(ProxyError::InvalidArgument {
                member: method.name().to_string(),
                reason: format!("{} is not a GET method", method.kind()),
            }
            .into());
        }
        method.get(&[])
    }

    /// Uploads a file through the collection's `upload` method.
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError::UnknownMember`] when the schema declares no
    /// `upload` method.
    pub fn upload(
        &self,
        filename: impl AsRef<Path>,
        payload: Option<Vec<u8>>,
    ) -> Result<ApiResponse, RestError> {
        if !self.methods.values().any(|m| m.tag() == "upload") {
            return Err(self.unknown("upload").into());
        }
        self.builder.upload(API_PREFIX, filename, payload)
    }

    pub fn members(&self) -> Vec<MemberInfo> {
        self.methods.values().map(BoundMethod::member_info).collect()
    }

    /// `TypeName(<listing>)` when the collection can be listed, otherwise
    /// the type name alone.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `list` request.
    pub fn repr(&self) -> Result<String, RestError> {
        if !self.methods.values().any(|m| m.kind() == MethodKind::List) {
            return Ok(self.type_name().to_string());
        }
        Ok(format!("{}({})", self.type_name(), self.list(None)?))
    }

    fn require(&self, kind: MethodKind) -> Result<&BoundMethod, ProxyError> {
        self.methods
            .values()
            .find(|m| m.kind() == kind)
            .ok_or_else(|| self.unknown(&kind.to_string()))
    }

    fn unknown(&self, name: &str) -> ProxyError {
        ProxyError::UnknownMember {
            owner: self.type_name().to_string(),
            name: name.to_string(),
        }
    }
}

/// Keys of a listing: array items, or object keys.
fn listing_keys(listing: &Value) -> Vec<String> {
    match listing {
        Value::Array(items) => items.iter().map(json::text).collect(),
        Value::Object(entries) => entries.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

/// A record matches when it has every filter field with an equal value.
fn record_matches(record: &Value, filter: &Map<String, Value>) -> bool {
    let Value::Object(fields) = record else {
        return false;
    };
    filter
        .iter()
        .all(|(field, expected)| fields.get(field) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_keys() {
        assert_eq!(listing_keys(&json!(["T1", "T2"])), ["T1", "T2"]);
        assert_eq!(listing_keys(&json!({"a": 1, "b": 2})), ["a", "b"]);
        assert_eq!(listing_keys(&json!([1, 2])), ["1", "2"]);
        assert!(listing_keys(&Value::Null).is_empty());
    }

    #[test]
    fn test_record_matches() {
        let Value::Object(filter) = json!({"status": "active"}) else {
            unreachable!()
        };
        assert!(record_matches(&json!({"status": "active", "x": 1}), &filter));
        assert!(!record_matches(&json!({"status": "idle"}), &filter));
        assert!(!record_matches(&json!({"x": 1}), &filter));
        assert!(!record_matches(&json!("active"), &filter));
        assert!(record_matches(&json!({}), &Map::new()));
    }
}
