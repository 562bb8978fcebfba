//! Argument checking for dynamically invoked members.

use serde_json::{Map, Value};

use crate::error::ProxyError;
use crate::json;

/// Fails unless `min <= args.len() <= max`.
pub(crate) fn arity(member: &str, args: &[Value], min: usize, max: usize) -> Result<(), ProxyError> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }

    let expected = match (min, max) {
        (0, 0) => "0",
        (0, 1) => "0 or 1",
        (1, 1) => "1",
        (1, 2) => "1 or 2",
        (2, 2) => "2",
        _ => "a different number of",
    };
    Err(ProxyError::Arity {
        member: member.to_string(),
        expected,
        got: args.len(),
    })
}

/// Reads an instance key. Strings are used as is, numbers are rendered.
pub(crate) fn key(member: &str, value: &Value) -> Result<String, ProxyError> {
    match value {
        Value::String(key) if !key.is_empty() => Ok(key.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ProxyError::InvalidArgument {
            member: member.to_string(),
            reason: format!("key must be a non-empty string, got {}", json::type_name(other)),
        }),
    }
}

/// Reads an optional `list` filter. `null` means no filter.
pub(crate) fn filter<'a>(
    member: &str,
    value: Option<&'a Value>,
) -> Result<Option<&'a Map<String, Value>>, ProxyError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(filter)) => Ok(Some(filter)),
        Some(other) => Err(ProxyError::InvalidArgument {
            member: member.to_string(),
            reason: format!("filter must be an object, got {}", json::type_name(other)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arity() {
        assert!(arity("create", &[json!("T1")], 1, 2).is_ok());
        let err = arity("retrieve", &[], 1, 1).unwrap_err();
        assert_eq!(err.to_string(), "retrieve() takes 1 argument(s) but 0 were given");
    }

    #[test]
    fn test_key() {
        assert_eq!(key("retrieve", &json!("T1")).unwrap(), "T1");
        assert_eq!(key("retrieve", &json!(7)).unwrap(), "7");
        assert!(key("retrieve", &json!("")).is_err());
        assert!(key("retrieve", &json!({"a": 1})).is_err());
    }

    #[test]
    fn test_filter() {
        let status = json!({"status": "active"});
        assert!(filter("list", None).unwrap().is_none());
        assert!(filter("list", Some(&Value::Null)).unwrap().is_none());
        assert_eq!(filter("list", Some(&status)).unwrap().map(|f| f.len()), Some(1));
        assert!(filter("list", Some(&json!(["status"]))).is_err());
    }
}
