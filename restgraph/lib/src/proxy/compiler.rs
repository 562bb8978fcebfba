//! Compilation of schema nodes into proxies.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace};

use super::child::{ChildProxy, Property};
use super::collection::CollectionProxy;
use super::method::BoundMethod;
use super::Proxy;
use crate::error::{NamingError, RestError};
use crate::ident::Ident;
use crate::schema::{ClassNode, MethodNode, Node, ObjectNode, Schema};
use crate::url_builder::UrlBuilder;

/// Compiles a resource node below `builder`.
///
/// The node's tag is appended to the builder. Singletons become a
/// [`ChildProxy`], everything else a [`CollectionProxy`].
///
/// ## Errors
///
/// Returns a naming error or schema error from anywhere in the subtree.
pub fn compile_object(node: &ObjectNode, builder: &UrlBuilder) -> Result<Proxy, RestError> {
    let builder = builder.join(node.tag());

    if node.is_singleton() {
        debug!(path = %node.dotted_path(), "Compiling singleton");
        Ok(Proxy::Child(compile_child(node, builder)?))
    } else {
        debug!(path = %node.dotted_path(), "Compiling collection");
        Ok(Proxy::Collection(compile_collection(node, builder)?))
    }
}

/// Compiles one resource instance bound to `builder`.
///
/// ## Errors
///
/// Returns a naming error or schema error from anywhere in the subtree.
pub fn compile_child(node: &ObjectNode, builder: UrlBuilder) -> Result<ChildProxy, RestError> {
    let (type_name, doc) = object_template(node)?;

    let properties = compile_properties(node.classes())?;
    let objects = compile_objects(node.objects(), &builder)?;
    let methods = compile_methods(node.methods(), &builder, false)?;

    trace!(
        type_name = %type_name,
        properties = properties.len(),
        objects = objects.len(),
        methods = methods.len(),
        "Compiled child"
    );

    Ok(ChildProxy {
        type_name,
        doc,
        builder,
        properties,
        objects,
        methods,
    })
}

/// Compiles a keyed collection bound to `builder`.
///
/// The instance schema is compiled once against the collection builder so
/// that naming errors surface now rather than on first index.
///
/// ## Errors
///
/// Returns a naming error or schema error from anywhere in the subtree.
pub fn compile_collection(
    node: &ObjectNode,
    builder: UrlBuilder,
) -> Result<CollectionProxy, RestError> {
    let (type_name, doc) = object_template(node)?;
    let methods = compile_methods(node.methods(), &builder, true)?;

    compile_child(node, builder.clone())?;

    trace!(
        type_name = %type_name,
        methods = methods.len(),
        "Compiled collection"
    );

    Ok(CollectionProxy {
        type_name,
        doc,
        builder,
        node: Arc::new(node.clone()),
        methods,
    })
}

/// Binds every method of a node, keyed by invocation name.
///
/// With `collection` set, `create`, `retrieve`, `update` and `delete` get
/// their keyed collection behavior.
///
/// ## Errors
///
/// Returns a naming error for an unusable tag and a schema error for a
/// missing or unsupported verb.
pub fn compile_methods(
    nodes: &[MethodNode],
    builder: &UrlBuilder,
    collection: bool,
) -> Result<BTreeMap<String, BoundMethod>, RestError> {
    let mut methods = BTreeMap::new();
    for node in nodes {
        let method = BoundMethod::compile(node, builder, collection)?;
        trace!(tag = node.tag(), kind = %method.kind(), url = method.url(), "Bound method");
        methods.insert(method.name().to_string(), method);
    }
    Ok(methods)
}

/// Turns `class` entries into properties keyed by sanitized name.
///
/// ## Errors
///
/// Returns a naming error for an unusable tag.
pub fn compile_properties(nodes: &[ClassNode]) -> Result<BTreeMap<String, Property>, NamingError> {
    nodes
        .iter()
        .map(|node| -> Result<(String, Property), NamingError> {
            let property = Property {
                name: Ident::sanitize(Some(node.tag()))?,
                tag: node.tag().to_string(),
                help: node.help(),
            };
            Ok((property.name().to_string(), property))
        })
        .collect()
}

/// Compiles nested resources keyed by their raw tag.
///
/// ## Errors
///
/// Returns the first compile error.
pub fn compile_objects(
    nodes: &[ObjectNode],
    builder: &UrlBuilder,
) -> Result<BTreeMap<String, Proxy>, RestError> {
    nodes
        .iter()
        .map(|node| -> Result<(String, Proxy), RestError> {
            Ok((node.tag().to_string(), compile_object(node, builder)?))
        })
        .collect()
}

/// Compiles the top-level proxy holding every module of `schema`.
///
/// ## Errors
///
/// Returns the first compile error.
pub fn compile_root(
    type_name: Ident,
    schema: &Schema,
    builder: &UrlBuilder,
) -> Result<ChildProxy, RestError> {
    let objects = compile_objects(schema.roots(), builder)?;
    debug!(type_name = %type_name, modules = objects.len(), "Compiled root");

    Ok(ChildProxy {
        type_name,
        doc: None,
        builder: builder.clone(),
        properties: BTreeMap::new(),
        objects,
        methods: BTreeMap::new(),
    })
}

/// Type name and documentation for a node.
fn object_template<K>(node: &Node<K>) -> Result<(Ident, Option<String>), NamingError> {
    let type_name = Ident::sanitize(node.name().as_deref())?;
    Ok((type_name, node.description()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyError;
    use crate::method::RestMethod;
    use crate::proxy::{CallOutput, MemberKind, MethodKind};
    use crate::testing::MockTransport;
    use serde_json::{json, Value};
    use url::Url;

    const BASE: &str = "http://nsc/SAFe/sng_rest/";

    fn schema() -> Schema {
        Schema::from_value(json!({
            "nsc": {
                "name": "NSC",
                "singleton": false,
                "object": {
                    "trunk": {
                        "name": "SIP Trunk",
                        "description": "Trunks",
                        "class": {
                            "enabled": {"help": "Enable the trunk"},
                            "max-calls": {"help": "Call limit"}
                        },
                        "methods": {
                            "list": {"request": "GET"},
                            "create": {"request": "POST"},
                            "retrieve": {"request": "GET"},
                            "update": {"request": "POST"},
                            "delete": {"request": "POST"},
                            "status": {"request": "GET", "description": ["Live", "status"]}
                        }
                    },
                    "configuration": {
                        "singleton": true,
                        "class": {"interface": {"help": "Select an interface"}},
                        "methods": {
                            "retrieve": {"request": "GET"},
                            "update": {"request": "POST"}
                        }
                    }
                },
                "methods": {
                    "restart": {"request": "POST"}
                }
            }
        }))
        .unwrap()
    }

    fn compile(transport: Arc<MockTransport>) -> ChildProxy {
        let builder = UrlBuilder::new(Url::parse(BASE).unwrap(), transport);
        compile_root(Ident::sanitize(Some("Nsc")).unwrap(), &schema(), &builder).unwrap()
    }

    #[test]
    fn test_root_module_is_singleton() {
        let root = compile(Arc::new(MockTransport::new()));
        let nsc = root.object("nsc").unwrap();
        assert!(!nsc.is_collection());
        assert_eq!(nsc.type_name(), "NSC");
    }

    #[test]
    fn test_nested_shapes() {
        let root = compile(Arc::new(MockTransport::new()));
        let nsc = root.object("nsc").unwrap().as_child().unwrap();

        let trunk = nsc.object("trunk").unwrap();
        assert!(trunk.is_collection());
        assert_eq!(trunk.type_name(), "SIPTrunk");
        assert_eq!(trunk.doc(), Some("Trunks"));

        let config = nsc.object("configuration").unwrap();
        assert!(!config.is_collection());
        assert_eq!(config.type_name(), "RestObject");
    }

    #[test]
    fn test_collection_methods_are_specialized() {
        let root = compile(Arc::new(MockTransport::new()));
        let trunks = root.walk(&["nsc", "trunk"]).unwrap();
        let trunks = trunks.as_collection().unwrap();

        assert_eq!(trunks.method("create").unwrap().kind(), MethodKind::Create);
        assert_eq!(trunks.method("status").unwrap().kind(), MethodKind::Get);
        assert_eq!(
            trunks.method("list").unwrap().url(),
            "http://nsc/SAFe/sng_rest/api/list/nsc/trunk"
        );
    }

    #[test]
    fn test_indexed_instance_methods_are_generic() {
        let root = compile(Arc::new(MockTransport::new()));
        let instance = root.walk(&["nsc", "trunk", "T1"]).unwrap();
        let instance = instance.as_child().unwrap();

        assert_eq!(instance.method("retrieve").unwrap().kind(), MethodKind::Get);
        assert_eq!(
            instance.method("retrieve").unwrap().url(),
            "http://nsc/SAFe/sng_rest/api/retrieve/nsc/trunk/T1"
        );
        assert_eq!(instance.interface(), ["enabled", "max-calls"]);
        assert!(instance.property("max_calls").is_some());
    }

    #[test]
    fn test_members_order() {
        let root = compile(Arc::new(MockTransport::new()));
        let nsc = root.object("nsc").unwrap();
        let kinds: Vec<MemberKind> = nsc.members().iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            [MemberKind::Method, MemberKind::Object, MemberKind::Collection]
        );
    }

    #[test]
    fn test_property_reads_retrieve() {
        let transport = Arc::new(MockTransport::new());
        transport.on_data(
            RestMethod::Get,
            format!("{BASE}api/retrieve/nsc/configuration"),
            json!({"interface": "eth0"}),
        );

        let root = compile(transport.clone());
        let config = root.walk(&["nsc", "configuration"]).unwrap();
        let config = config.as_child().unwrap();

        assert_eq!(config.get_property("interface").unwrap(), json!("eth0"));
        assert_eq!(
            transport.count(RestMethod::Get, &format!("{BASE}api/retrieve/nsc/configuration")),
            1
        );
        assert_eq!(
            config.repr().unwrap(),
            r#"RestObject({"interface":"eth0"})"#
        );
    }

    #[test]
    fn test_property_write_posts_update() {
        let transport = Arc::new(MockTransport::new());
        let url = format!("{BASE}api/update/nsc/configuration");
        transport.on_data(RestMethod::Post, url.clone(), Value::Null);

        let root = compile(transport.clone());
        let config = root.walk(&["nsc", "configuration"]).unwrap();
        config
            .as_child()
            .unwrap()
            .set_property("interface", json!("eth1"))
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, url);
        assert_eq!(requests[0].json(), Some(json!({"interface": "eth1"})));
    }

    #[test]
    fn test_missing_field() {
        let transport = Arc::new(MockTransport::new());
        transport.on_data(
            RestMethod::Get,
            format!("{BASE}api/retrieve/nsc/configuration"),
            json!({}),
        );

        let root = compile(transport);
        let err = root
            .walk(&["nsc", "configuration"])
            .unwrap()
            .as_child()
            .unwrap()
            .get_property("interface")
            .unwrap_err();
        assert!(matches!(err, RestError::Proxy(ProxyError::MissingField { .. })));
    }

    #[test]
    fn test_generic_post_returns_unit() {
        let transport = Arc::new(MockTransport::new());
        transport.on_data(RestMethod::Post, format!("{BASE}api/restart/nsc"), Value::Null);

        let root = compile(transport);
        let output = root.object("nsc").unwrap().invoke("restart", &[]).unwrap();
        assert!(matches!(output, CallOutput::Unit));
    }

    #[test]
    fn test_unknown_member() {
        let root = compile(Arc::new(MockTransport::new()));
        let err = root.object("nsc").unwrap().invoke("reboot", &[]).unwrap_err();
        assert!(matches!(
            err,
            RestError::Proxy(ProxyError::UnknownMember { ref name, .. }) if name == "reboot"
        ));
        assert!(root.walk(&["nsc", "missing"]).is_err());
    }

    #[test]
    fn test_child_cannot_be_indexed() {
        let root = compile(Arc::new(MockTransport::new()));
        let nsc = root.object("nsc").unwrap();
        assert!(matches!(
            nsc.index("x"),
            Err(RestError::Proxy(ProxyError::NotIndexable { .. }))
        ));
    }

    #[test]
    fn test_naming_error_aborts_compile() {
        let schema = Schema::from_value(json!({
            "nsc": {"object": {"trunk": {"name": "2fast", "methods": {}}}}
        }))
        .unwrap();
        let builder = UrlBuilder::new(Url::parse(BASE).unwrap(), Arc::new(MockTransport::new()));
        let err = compile_root(Ident::sanitize(None).unwrap(), &schema, &builder).unwrap_err();
        assert!(matches!(err, RestError::Naming(NamingError::LeadingDigit { .. })));
    }

    #[test]
    fn test_missing_verb_is_schema_error() {
        let schema = Schema::from_value(json!({
            "nsc": {"methods": {"status": {"name": "Status"}}}
        }))
        .unwrap();
        let builder = UrlBuilder::new(Url::parse(BASE).unwrap(), Arc::new(MockTransport::new()));
        let err = compile_root(Ident::sanitize(None).unwrap(), &schema, &builder).unwrap_err();
        assert!(matches!(err, RestError::Schema(_)));
    }
}
