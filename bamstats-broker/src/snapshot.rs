use std::collections::HashMap;

use log::warn;
use serde_json::{Map, Value};

///
/// Latest value of every metric seen during one streaming session.
///
#[derive(Debug, Default, Clone)]
pub struct StatSnapshot {
    values: HashMap<String, Value>,
}

impl StatSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Fold a batch of decoded objects into the snapshot.
    ///
    /// Objects are merged in order, so a later object overrides an earlier one at the
    /// same key. Returns the fields whose value differs structurally from the previous
    /// snapshot, sorted by key. Values that are not JSON objects are skipped.
    ///
    pub fn apply(&mut self, objects: Vec<Value>) -> Vec<(String, Value)> {
        let mut merged: Map<String, Value> = Map::new();
        for object in objects {
            match object {
                Value::Object(fields) => merged.extend(fields),
                other => warn!("ignoring non-object stream value: {}", other),
            }
        }

        let mut changed = Vec::new();
        for (key, value) in merged {
            if self.values.get(&key) == Some(&value) {
                continue;
            }
            self.values.insert(key.clone(), value.clone());
            changed.push((key, value));
        }
        changed.sort_by(|a, b| a.0.cmp(&b.0));
        changed
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
