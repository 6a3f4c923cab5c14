//! Shared pipeline state and per-step partial updates.
//!
//! [`SharedState`] is the accumulating mapping threaded through a run. It is
//! owned by the executor; handlers only ever see `&SharedState` and hand back a
//! [`PartialState`] describing the fields they want to set.
//!
//! # Merge semantics
//!
//! Merging is **wholesale key replacement**. A partial update of
//! `{"leads": [...]}` replaces the entire `leads` entry; it never appends to or
//! deep-merges with the previous value. A handler that wants to extend a list
//! must read the current value, build the extended list, and return it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The accumulating state of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedState(Map<String, Value>);

/// The subset of state fields a single step contributes.
///
/// An empty partial state is the documented way for a step to say
/// "nothing to do".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialState(Map<String, Value>);

impl SharedState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Field value, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field as a list of records.
    ///
    /// Absent fields and non-array values both read as an empty slice, which
    /// is how steps detect missing upstream data.
    pub fn records(&self, key: &str) -> &[Value] {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge a partial update, replacing every key it contains.
    ///
    /// Returns the keys that were written, in sorted order.
    pub fn merge(&mut self, partial: PartialState) -> Vec<String> {
        let mut written = Vec::with_capacity(partial.0.len());
        for (key, value) in partial.0 {
            self.0.insert(key.clone(), value);
            written.push(key);
        }
        written
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for SharedState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for SharedState {
    type Error = String;

    /// Only JSON objects can become state; `null` is treated as empty.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(format!(
                "initial state must be a JSON object, got {}",
                json_type_name(&other)
            )),
        }
    }
}

impl PartialState {
    /// An empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Set a field in the update.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<Map<String, Value>> for PartialState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
