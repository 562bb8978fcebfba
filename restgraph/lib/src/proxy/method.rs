//! Methods bound to a URL builder.

use serde::Serialize;
use serde_json::Value;
use strum::Display;

use super::{args, CallOutput, MemberInfo, MemberKind};
use crate::error::RestError;
use crate::ident::Ident;
use crate::method::RestMethod;
use crate::response::ApiResponse;
use crate::schema::MethodNode;
use crate::url_builder::UrlBuilder;

/// Prefix of every method URL.
pub(crate) const API_PREFIX: &str = "api";

/// How a method behaves when called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// `list(filter?)`: the listing, optionally filtered by retrieving each
    /// entry.
    List,
    /// `create(key, data?)` on a collection.
    Create,
    /// `retrieve(key)` on a collection.
    Retrieve,
    /// `update(key, data)` on a collection.
    Update,
    /// `delete(key)` on a collection.
    Delete,
    /// Zero-argument GET returning data.
    Get,
    /// POST with an optional body, returning nothing.
    Post,
}

impl MethodKind {
    /// Resolves the behavior of a schema method.
    ///
    /// `list` is always specialized. The four record verbs are specialized
    /// only on collections. Everything else follows the declared verb.
    fn resolve(node: &MethodNode, collection: bool) -> Result<Self, RestError> {
        let kind = match node.tag() {
            "list" => Self::List,
            "create" if collection => Self::Create,
            "retrieve" if collection => Self::Retrieve,
            "update" if collection => Self::Update,
            "delete" if collection => Self::Delete,
            _ => match node.request()? {
                RestMethod::Get => Self::Get,
                RestMethod::Post => Self::Post,
            },
        };
        Ok(kind)
    }
}

/// A schema method together with the builder it is called through.
#[derive(Debug, Clone)]
pub struct BoundMethod {
    name: Ident,
    tag: String,
    kind: MethodKind,
    doc: Option<String>,
    url: String,
    builder: UrlBuilder,
}

impl BoundMethod {
    pub(crate) fn compile(
        node: &MethodNode,
        builder: &UrlBuilder,
        collection: bool,
    ) -> Result<Self, RestError> {
        let kind = MethodKind::resolve(node, collection)?;
        let name = Ident::sanitize(Some(node.tag()))?;

        Ok(Self {
            name,
            tag: node.tag().to_string(),
            kind,
            doc: node.description(),
            url: builder.render_url(API_PREFIX, Some(node.tag()), &[]),
            builder: builder.clone(),
        })
    }

    /// The name the method is invoked by.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The raw schema tag, used in the URL.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// URL of the method without keys.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn get(&self, keys: &[&str]) -> Result<ApiResponse, RestError> {
        self.builder.get(API_PREFIX, Some(&self.tag), keys)
    }

    pub(crate) fn post(&self, keys: &[&str], body: Option<&Value>) -> Result<ApiResponse, RestError> {
        self.builder.post(API_PREFIX, Some(&self.tag), keys, body)
    }

    /// Calls a generic GET or POST method.
    ///
    /// GET takes no arguments and returns the response data. POST takes an
    /// optional body and returns nothing.
    pub(crate) fn call_generic(&self, args: &[Value]) -> Result<CallOutput, RestError> {
        match self.kind {
            MethodKind::Post => {
                args::arity(self.name(), args, 0, 1)?;
                self.post(&[], args.first())?;
                Ok(CallOutput::Unit)
            }
            _ => {
                args::arity(self.name(), args, 0, 0)?;
                Ok(CallOutput::Data(self.get(&[])?.into_data()))
            }
        }
    }

    pub(crate) fn member_info(&self) -> MemberInfo {
        MemberInfo {
            name: self.name().to_string(),
            kind: MemberKind::Method,
            method: Some(self.kind),
            doc: self.doc.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::testing::MockTransport;
    use serde_json::json;
    use std::sync::Arc;
    use url::Url;

    fn methods(spec: Value) -> Vec<MethodNode> {
        let schema = Schema::from_value(json!({"nsc": {"methods": spec}})).unwrap();
        schema.roots()[0].methods().to_vec()
    }

    fn builder() -> UrlBuilder {
        UrlBuilder::new(
            Url::parse("http://nsc/SAFe/sng_rest/").unwrap(),
            Arc::new(MockTransport::new()),
        )
        .join("nsc")
    }

    #[test]
    fn test_resolution_order() {
        let nodes = methods(json!({
            "list": {"request": "POST"},
            "retrieve": {"request": "GET"},
            "status": {"request": "GET"},
            "restart": {"request": "POST", "description": ["Restart", "the service"]}
        }));

        let kinds = |collection| -> Vec<MethodKind> {
            nodes
                .iter()
                .map(|n| BoundMethod::compile(n, &builder(), collection).unwrap().kind())
                .collect()
        };

        assert_eq!(
            kinds(true),
            [MethodKind::List, MethodKind::Retrieve, MethodKind::Get, MethodKind::Post]
        );
        assert_eq!(
            kinds(false),
            [MethodKind::List, MethodKind::Get, MethodKind::Get, MethodKind::Post]
        );
    }

    #[test]
    fn test_url_and_doc() {
        let nodes = methods(json!({"restart": {"request": "POST", "description": ["Restart", "now"]}}));
        let method = BoundMethod::compile(&nodes[0], &builder(), false).unwrap();
        assert_eq!(method.url(), "http://nsc/SAFe/sng_rest/api/restart/nsc");
        assert_eq!(method.doc(), Some("Restart\nnow"));
        assert_eq!(method.name(), "restart");
    }

    #[test]
    fn test_sanitized_name() {
        let nodes = methods(json!({"apply-changes": {"request": "POST"}}));
        let method = BoundMethod::compile(&nodes[0], &builder(), false).unwrap();
        assert_eq!(method.name(), "apply_changes");
        assert_eq!(method.tag(), "apply-changes");
        assert_eq!(method.url(), "http://nsc/SAFe/sng_rest/api/apply-changes/nsc");
    }

    #[test]
    fn test_keyword_tag_is_a_naming_error() {
        let nodes = methods(json!({"move": {"request": "POST"}}));
        let err = BoundMethod::compile(&nodes[0], &builder(), false).unwrap_err();
        assert!(matches!(err, RestError::Naming(_)));
    }

    #[test]
    fn test_generic_arity() {
        let nodes = methods(json!({"status": {"request": "GET"}}));
        let method = BoundMethod::compile(&nodes[0], &builder(), false).unwrap();
        let err = method.call_generic(&[json!(1)]).unwrap_err();
        assert!(matches!(err, RestError::Proxy(_)));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MethodKind::Retrieve.to_string(), "retrieve");
        assert_eq!(serde_json::to_value(MethodKind::Get).unwrap(), json!("get"));
    }
}
