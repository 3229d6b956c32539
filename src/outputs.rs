//! Workflow outputs as reported by the engine.
//!
//! Cromwell reports each output as a single path, a list of paths (one per
//! shard) or a list of lists (scatter within scatter), with no discriminator.
//! The shape is inspected once when the outputs are decoded.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Value of one workflow output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskOutputs {
    Single(String),
    Flat(Vec<String>),
    Nested(Vec<Vec<String>>),
    /// Anything that is not a file path (numbers, booleans, null, objects)
    Other(Value),
}

impl TaskOutputs {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(path) => TaskOutputs::Single(path),
            Value::Array(items) => {
                if items.iter().any(Value::is_array) {
                    match nested_paths(&items) {
                        Some(shards) => TaskOutputs::Nested(shards),
                        None => TaskOutputs::Other(Value::Array(items)),
                    }
                } else {
                    match string_items(&items) {
                        Some(paths) => TaskOutputs::Flat(paths),
                        None => TaskOutputs::Other(Value::Array(items)),
                    }
                }
            }
            other => TaskOutputs::Other(other),
        }
    }

    /// Paths in order, with one level of nesting flattened.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            TaskOutputs::Single(path) => vec![path.as_str()],
            TaskOutputs::Flat(paths) => paths.iter().map(String::as_str).collect(),
            TaskOutputs::Nested(shards) => shards.iter().flatten().map(String::as_str).collect(),
            TaskOutputs::Other(_) => Vec::new(),
        }
    }

    pub fn is_paths(&self) -> bool {
        !matches!(self, TaskOutputs::Other(_))
    }
}

fn string_items(items: &[Value]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

// A bare string next to sublists counts as a one-path shard.
fn nested_paths(items: &[Value]) -> Option<Vec<Vec<String>>> {
    items
        .iter()
        .map(|item| match item {
            Value::Array(inner) => string_items(inner),
            Value::String(path) => Some(vec![path.clone()]),
            _ => None,
        })
        .collect()
}

impl<'de> Deserialize<'de> for TaskOutputs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(TaskOutputs::from_value)
    }
}

/// Output name to value, in the order the engine listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowOutputs(pub IndexMap<String, TaskOutputs>);

impl WorkflowOutputs {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TaskOutputs)> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TaskOutputs> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TaskOutputs)> for WorkflowOutputs {
    fn from_iter<I: IntoIterator<Item = (String, TaskOutputs)>>(iter: I) -> Self {
        WorkflowOutputs(iter.into_iter().collect())
    }
}
