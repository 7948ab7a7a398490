//! Request-scoped key-value store.
//!
//! Every [`Request`](crate::Request) owns one [`Context`]. Middleware writes
//! into it before calling [`Next::run`](crate::middleware::Next::run); the
//! handler reads from it. The store is dropped together with the request, so
//! nothing leaks across requests and there is no global registry.

use std::collections::HashMap;

use serde_json::Value;

/// Per-request annotations keyed by name.
///
/// Values are [`serde_json::Value`]s so a handler can put them straight into
/// a JSON response without knowing what type the middleware stored.
#[derive(Debug, Default, Clone)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the value under `key` and whether it was present.
    ///
    /// The pair mirrors the found/not-found lookup handlers rely on; the value
    /// half is [`Value::Null`] when the key is absent.
    pub fn lookup(&self, key: &str) -> (Value, bool) {
        match self.values.get(key) {
            Some(v) => (v.clone(), true),
            None => (Value::Null, false),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Shorthand for string annotations.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
