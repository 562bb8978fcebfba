//! Small helpers for working with untyped JSON values.

use serde_json::{Map, Value};

/// Truthiness of a JSON value: `null`, `false`, `0`, `""`, `[]` and `{}`
/// are false, everything else is true.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Renders a value as text: strings verbatim, anything else as JSON.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Returns the JSON type name used in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builds documentation text from a schema `description`/`help` field.
///
/// Descriptions are sometimes published as a list of lines.
pub(crate) fn doc_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::Array(lines) => Some(lines.iter().map(text).collect::<Vec<_>>().join("\n")),
        other => Some(text(other)),
    }
}

/// Returns a copy of `value` with every object's keys in sorted order.
pub(crate) fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!([])));
        assert!(!truthy(&json!({})));
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(0.5)));
        assert!(truthy(&json!("ok")));
        assert!(truthy(&json!({"a": 1})));
    }

    #[test]
    fn test_text() {
        assert_eq!(text(&json!("plain")), "plain");
        assert_eq!(text(&json!(42)), "42");
        assert_eq!(text(&json!(null)), "null");
    }

    #[test]
    fn test_doc_string_joins_lines() {
        assert_eq!(
            doc_string(Some(&json!(["first", "second"]))).as_deref(),
            Some("first\nsecond")
        );
        assert_eq!(doc_string(Some(&json!("single"))).as_deref(), Some("single"));
        assert_eq!(doc_string(Some(&json!(null))), None);
        assert_eq!(doc_string(None), None);
    }

    #[test]
    fn test_sorted_orders_nested_keys() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]});
        let rendered = serde_json::to_string(&sorted(&value)).unwrap();
        assert_eq!(rendered, r#"{"a":[{"x":2,"y":1}],"b":{"a":2,"z":1}}"#);
    }
}
