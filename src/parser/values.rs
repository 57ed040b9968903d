//! Values flattener: turns a parsed values tree into dotted-path leaves.
//!
//! Maps compose with `.`, sequences with `[i]`. Sequences made only of
//! scalars are documented as a whole and stay a single leaf; any other
//! sequence is expanded per index. Empty maps and sequences are leaves too.

use crate::error::Result;
use crate::model::{Leaf, ParamValue};
use serde_json::{Number, Value as JsonValue};
use serde_yaml::Value;
use std::collections::HashSet;

/// Parse a values file and flatten it.
pub fn parse(input: &str) -> Result<Vec<Leaf>> {
    let tree: Value = serde_yaml::from_str(input)?;
    Ok(flatten(&tree))
}

/// Flatten a values tree into leaves, depth-first in declaration order.
///
/// Only a mapping root produces leaves; an empty document yields none.
pub fn flatten(tree: &Value) -> Vec<Leaf> {
    let mut flattener = Flattener::default();
    if let Value::Mapping(map) = untag(tree) {
        for (key, value) in map {
            let key = key_string(key);
            let schema = !key.contains('.');
            flattener.walk(key, value, schema);
        }
    }
    flattener.leaves
}

#[derive(Default)]
struct Flattener {
    leaves: Vec<Leaf>,
    seen: HashSet<String>,
}

impl Flattener {
    fn walk(&mut self, path: String, value: &Value, schema: bool) {
        match untag(value) {
            Value::Mapping(map) if map.is_empty() => {
                self.push(path, ParamValue::empty_object(), schema);
            }
            Value::Mapping(map) => {
                for (key, child) in map {
                    let key = key_string(key);
                    let child_schema = schema && !key.contains('.');
                    self.walk(format!("{path}.{key}"), child, child_schema);
                }
            }
            Value::Sequence(items) if items.iter().all(is_scalar) => {
                let items = items.iter().map(scalar_to_json).collect();
                self.push(path, ParamValue::Array(items), schema);
            }
            Value::Sequence(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.walk(format!("{path}[{i}]"), child, schema);
                }
            }
            scalar => {
                let value = ParamValue::from(scalar_to_json(scalar));
                self.push(path, value, schema);
            }
        }
    }

    fn push(&mut self, name: String, value: ParamValue, schema: bool) {
        // Keys like "a.b" can collide with a nested a -> b; first one wins
        if !self.seen.insert(name.clone()) {
            return;
        }
        self.leaves.push(Leaf {
            name,
            kind: value.kind(),
            value,
            schema,
        });
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        untag(value),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

fn key_string(key: &Value) -> String {
    match untag(key) {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn scalar_to_json(value: &Value) -> JsonValue {
    match untag(value) {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else if let Some(whole) = n.as_f64().and_then(whole_number) {
                JsonValue::from(whole)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(JsonValue::Number)
                    // .nan and .inf have no JSON number form
                    .unwrap_or_else(|| JsonValue::String(n.to_string()))
            }
        }
        other => serde_json::to_value(other).unwrap_or(JsonValue::Null),
    }
}

/// `1.0` → `1`, `1e3` → `1000`; only values an `f64` holds exactly.
fn whole_number(f: f64) -> Option<i64> {
    const EXACT: f64 = (1u64 << 53) as f64;
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= EXACT).then_some(f as i64)
}
