//! Optional-path access into untyped cluster objects.
//!
//! Every lookup returns `None` on a missing segment or a type mismatch, so
//! callers never branch on partial object shapes themselves.

use serde_json::{Map, Value};

/// Walk a dot-separated `path` (e.g. `"metadata.creationTimestamp"`) through
/// nested objects. Array indexing is not supported; use [`get_array`] and
/// iterate instead.
pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

pub fn get_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    get(value, path)?.as_str()
}

pub fn get_bool(value: &Value, path: &str) -> Option<bool> {
    get(value, path)?.as_bool()
}

pub fn get_array<'a>(value: &'a Value, path: &str) -> Option<&'a Vec<Value>> {
    get(value, path)?.as_array()
}

pub fn get_object<'a>(value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
    get(value, path)?.as_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "metadata": {"name": "db", "labels": {"team": "data"}},
            "status": {
                "ready": true,
                "conditions": [{"type": "Ready", "status": "True"}]
            }
        })
    }

    #[test]
    fn resolves_nested_paths() {
        let v = sample();
        assert_eq!(get_str(&v, "metadata.name"), Some("db"));
        assert_eq!(get_bool(&v, "status.ready"), Some(true));
        assert_eq!(get_array(&v, "status.conditions").map(Vec::len), Some(1));
        assert!(get_object(&v, "metadata.labels").is_some());
    }

    #[test]
    fn missing_segments_yield_none() {
        let v = sample();
        assert!(get(&v, "spec.forProvider.region").is_none());
        assert!(get_str(&v, "metadata.namespace").is_none());
    }

    #[test]
    fn type_mismatch_yields_none() {
        let v = sample();
        assert!(get_bool(&v, "metadata.name").is_none());
        // descending through a non-object stops the walk
        assert!(get(&v, "metadata.name.first").is_none());
        assert!(get(&v, "status.conditions.type").is_none());
    }

    #[test]
    fn empty_path_is_the_root() {
        let v = json!(42);
        assert_eq!(get(&v, ""), Some(&json!(42)));
    }
}
