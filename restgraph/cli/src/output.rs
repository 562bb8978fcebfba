//! Text rendering for command results.

use restgraph_lib::{CallOutput, MemberInfo, Proxy};
use serde_json::Value;

/// Renders a resource and its members, one member per line.
pub fn render_tree(node: &Proxy) -> String {
    let mut out = String::new();
    let kind = if node.is_collection() {
        "collection"
    } else {
        "resource"
    };
    out.push_str(&format!("{} ({kind})\n", node.type_name()));
    if let Some(doc) = node.doc() {
        for line in doc.lines() {
            out.push_str(&format!("  # {line}\n"));
        }
    }

    for member in node.members() {
        out.push_str(&render_member(&member));
        out.push('\n');
    }
    out
}

fn render_member(member: &MemberInfo) -> String {
    let kind = match member.method {
        Some(method) => format!("{}:{method}", member.kind),
        None => member.kind.to_string(),
    };
    let line = format!("  {kind:<16} {}", member.name);
    match member.doc.as_deref().and_then(|d| d.lines().next()) {
        Some(doc) => format!("{line:<40} {doc}"),
        None => line,
    }
}

/// Pretty JSON for a value.
pub fn render_value(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string_pretty(other),
    }
}

/// Output for a method call; `None` when the method returns nothing.
pub fn render_call(output: CallOutput) -> Result<Option<String>, serde_json::Error> {
    match output {
        CallOutput::Data(value) => render_value(&value).map(Some),
        CallOutput::Instance(child) => Ok(Some(child.type_name().to_string())),
        CallOutput::Unit => Ok(None),
    }
}
