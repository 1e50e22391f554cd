//! Keyword payload carried by events
//!
//! Payloads are loosely typed on purpose: the bus hands the same payload to
//! every subscriber verbatim and never validates it. Accessors follow the
//! "read with a default" convention so a missing or mistyped key degrades
//! to the default instead of failing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Named arguments attached to an emitted event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    args: Map<String, Value>,
}

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    ///
    /// Values that cannot be represented (e.g. maps with non-string keys) are
    /// stored as `null`.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value
    pub fn set(&mut self, key: &str, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::warn!("Payload value for '{}' is not representable: {}", key, e);
            Value::Null
        });
        self.args.insert(key.to_string(), value);
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// True when the payload carries no arguments
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Raw JSON value for a key
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.args
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Get an integer value
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.args
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or(default)
    }

    /// Get a float value (integers are widened)
    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.args
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(default)
    }

    /// Get a string value
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.args
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Get a list of strings; non-string entries are skipped
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.args
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deserialize a single argument
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.args
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Iterate over arguments in insertion-independent key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.args.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Object(self.args)
    }

    pub(crate) fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(args) => Some(Self { args }),
            Value::Null => Some(Self::new()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getters_with_defaults() {
        let payload = Payload::new()
            .with("problem_slug", "two-sum")
            .with("duration_ms", 5000)
            .with("max_intensity", 2.5)
            .with("silent", true);

        assert_eq!(payload.get_string("problem_slug", ""), "two-sum");
        assert_eq!(payload.get_int("duration_ms", 0), 5000);
        assert_eq!(payload.get_float("max_intensity", 0.0), 2.5);
        assert!(payload.get_bool("silent", false));

        assert_eq!(payload.get_int("missing", -1), -1);
        assert_eq!(payload.get_string("duration_ms", "fallback"), "fallback");
    }

    #[test]
    fn test_string_list() {
        let payload = Payload::new().with("lines", vec!["hello", "world"]);
        assert_eq!(payload.get_string_list("lines"), vec!["hello", "world"]);
        assert!(payload.get_string_list("nope").is_empty());
    }

    #[test]
    fn test_generic_get() {
        let payload = Payload::new().with("current_line", 3u32);
        assert_eq!(payload.get::<u32>("current_line"), Some(3));
        assert_eq!(payload.get::<String>("current_line"), None);
    }

    #[test]
    fn test_set_replaces() {
        let mut payload = Payload::new().with("text", "a");
        payload.set("text", "b");
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get_string("text", ""), "b");
    }
}
