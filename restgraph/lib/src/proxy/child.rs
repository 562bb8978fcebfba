//! Proxies for single addressable resources.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};

use super::method::{BoundMethod, MethodKind, API_PREFIX};
use super::{args, CallOutput, MemberInfo, MemberKind, Proxy};
use crate::error::{ProxyError, RestError};
use crate::ident::Ident;
use crate::response::ApiResponse;
use crate::url_builder::UrlBuilder;

/// A property synthesized from a `class` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub(crate) name: Ident,
    pub(crate) tag: String,
    pub(crate) help: Option<String>,
}

impl Property {
    /// The name the property is reached by.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The record field the property reads and writes.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

/// One addressable resource instance.
///
/// Properties read through `retrieve` and write through `update`. Nested
/// objects are reached with [`ChildProxy::object`].
#[derive(Debug, Clone)]
pub struct ChildProxy {
    pub(crate) type_name: Ident,
    pub(crate) doc: Option<String>,
    pub(crate) builder: UrlBuilder,
    pub(crate) properties: BTreeMap<String, Property>,
    pub(crate) objects: BTreeMap<String, Proxy>,
    pub(crate) methods: BTreeMap<String, BoundMethod>,
}

impl ChildProxy {
    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The builder bound to this resource.
    pub fn builder(&self) -> &UrlBuilder {
        &self.builder
    }

    /// Looks up a method by name.
    pub fn method(&self, name: &str) -> Option<&BoundMethod> {
        self.methods.get(name)
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Nested objects keyed by their schema tag.
    pub fn objects(&self) -> &BTreeMap<String, Proxy> {
        &self.objects
    }

    /// The record fields exposed as properties.
    pub fn interface(&self) -> Vec<&str> {
        self.properties.values().map(Property::tag).collect()
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Returns a nested object by tag.
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError::UnknownMember`] if there is no such object.
    pub fn object(&self, tag: &str) -> Result<&Proxy, ProxyError> {
        self.objects.get(tag).ok_or_else(|| self.unknown(tag))
    }

    /// Follows nested object tags and collection keys from this resource.
    ///
    /// ## Errors
    ///
    /// See [`Proxy::walk`].
    pub fn walk<S: AsRef<str>>(&self, path: &[S]) -> Result<Proxy, RestError> {
        Proxy::Child(self.clone()).walk(path)
    }

    /// Calls a method by name with JSON arguments.
    ///
    /// `list` takes no arguments (a filter needs a collection to index). Other
    /// GET methods take no arguments and return data. POST methods take an
    /// optional body and return [`CallOutput::Unit`].
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError`]s for unknown methods and bad arguments, and the
    /// request error otherwise.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<CallOutput, RestError> {
        let method = self.methods.get(name).ok_or_else(|| self.unknown(name))?;

        match method.kind() {
            MethodKind::List => {
                args::arity(method.name(), args, 0, 1)?;
                if args::filter(method.name(), args.first())?.is_some() {
                    return Err(ProxyError::NotIndexable {
                        owner: self.type_name().to_string(),
                    }
                    .into());
                }
                Ok(CallOutput::Data(method.get(&[])?.into_data()))
            }
            _ => method.call_generic(args),
        }
    }

    /// Calls `retrieve` and returns the record.
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError::UnknownMember`] when the resource has no
    /// `retrieve` method.
    pub fn retrieve(&self) -> Result<Value, RestError> {
        Ok(self.invoke("retrieve", &[])?.into_data().unwrap_or(Value::Null))
    }

    /// Calls `update` with `data`.
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError::UnknownMember`] when the resource has no
    /// `update` method.
    pub fn update(&self, data: Value) -> Result<(), RestError> {
        self.invoke("update", &[data])?;
        Ok(())
    }

    /// Reads a property: one `retrieve` call, then the property's field.
    ///
    /// ## Errors
    ///
    /// Returns [`ProxyError::MissingField`] if the record lacks the field.
    pub fn get_property(&self, name: &str) -> Result<Value, RestError> {
        let property = self.properties.get(name).ok_or_else(|| self.unknown(name))?;
        let record = self.retrieve()?;

        record
            .get(&property.tag)
            .cloned()
            .ok_or_else(|| {
                ProxyError::MissingField {
                    owner: self.type_name().to_string(),
                    field: property.tag.clone(),
                }
                .into()
            })
    }

    /// Writes a property: one `update` call with `{field: value}`.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `update` request.
    pub fn set_property(&self, name: &str, value: Value) -> Result<(), RestError> {
        let property = self.properties.get(name).ok_or_else(|| self.unknown(name))?;
        let mut data = Map::new();
        data.insert(property.tag.clone(), value);
        self.update(Value::Object(data))
    }

    /// Performs a declared GET method and returns the interpreted response
    /// without unpacking it, so binary payloads are reachable.
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

    /// Uploads a file through the resource's `upload` method.
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

    /// All members: methods, then objects, then properties.
    pub fn members(&self) -> Vec<MemberInfo> {
        let methods = self.methods.values().map(BoundMethod::member_info);
        let objects = self.objects.iter().map(|(tag, proxy)| MemberInfo {
            name: tag.clone(),
            kind: if proxy.is_collection() {
                MemberKind::Collection
            } else {
                MemberKind::Object
            },
            method: None,
            doc: proxy.doc().map(str::to_string),
        });
        let properties = self.properties.values().map(|p| MemberInfo {
            name: p.name().to_string(),
            kind: MemberKind::Property,
            method: None,
            doc: p.help.clone(),
        });

        methods.chain(objects).chain(properties).collect()
    }

    /// `TypeName(<record>)` when the resource can be retrieved, otherwise
    /// the type name alone.
    ///
    /// ## Errors
    ///
    /// Returns the error of the `retrieve` request.
    pub fn repr(&self) -> Result<String, RestError> {
        if !self.methods.contains_key("retrieve") {
            return Ok(self.type_name().to_string());
        }
        Ok(format!("{}({})", self.type_name(), self.retrieve()?))
    }

    fn unknown(&self, name: &str) -> ProxyError {
        ProxyError::UnknownMember {
            owner: self.type_name().to_string(),
            name: name.to_string(),
        }
    }
}
