//! Small helpers over JSON objects.

use serde_json::{Map, Value};

/// Returns a copy of `source` without the given keys.
pub fn omit(source: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    source
        .iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Returns a copy of `source` without `null` entries.
pub fn compact(source: &Map<String, Value>) -> Map<String, Value> {
    source
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Shallowly merges `patch` over `base`.
///
/// Non-object values on either side are treated as empty objects, so merging
/// `None` with data yields the data itself.
pub fn shallow_merge(base: Option<&Value>, patch: Option<&Value>) -> Map<String, Value> {
    let mut merged = match base {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    if let Some(Value::Object(map)) = patch {
        for (k, v) in map {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}

/// Compares two objects key by key.
///
/// Values are compared with `Value` equality, which is structural.
pub fn shallow_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
}

/// Returns true for data that should be shown as null: absent, `null` or `{}`.
pub fn is_empty_data(data: Option<&Value>) -> bool {
    match data {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_omit() {
        let source = obj(json!({"a": 1, "b": 2, "c": 3}));
        let out = omit(&source, &["b", "missing"]);
        assert_eq!(Value::Object(out), json!({"a": 1, "c": 3}));
        // source untouched
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn test_compact() {
        let source = obj(json!({"a": null, "b": false, "c": 0}));
        assert_eq!(Value::Object(compact(&source)), json!({"b": false, "c": 0}));
    }

    #[test]
    fn test_shallow_merge() {
        let base = json!({"a": 1, "nested": {"x": 1}});
        let patch = json!({"nested": {"y": 2}, "b": 2});
        let merged = shallow_merge(Some(&base), Some(&patch));
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2, "nested": {"y": 2}}));

        assert_eq!(Value::Object(shallow_merge(None, Some(&patch))), patch);
        assert!(shallow_merge(Some(&json!(3)), None).is_empty());
    }

    #[test]
    fn test_shallow_equal() {
        let a = obj(json!({"id": 1, "filter": {"name": "pika"}}));
        let b = obj(json!({"filter": {"name": "pika"}, "id": 1}));
        let c = obj(json!({"id": 2, "filter": {"name": "pika"}}));
        assert!(shallow_equal(&a, &b));
        assert!(!shallow_equal(&a, &c));
        assert!(!shallow_equal(&a, &Map::new()));
    }

    #[test]
    fn test_is_empty_data() {
        assert!(is_empty_data(None));
        assert!(is_empty_data(Some(&Value::Null)));
        assert!(is_empty_data(Some(&json!({}))));
        assert!(!is_empty_data(Some(&json!({"a": 1}))));
        assert!(!is_empty_data(Some(&json!([]))));
    }
}
