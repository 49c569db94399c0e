//! Canonicalize raw filter trees.
//!
//! Query-string decoders turn `a[0]=x&a[1]=y` into `{ "0": "x", "1": "y" }`
//! instead of a sequence. `normalize` repairs that at any depth, then wraps
//! bare values under `in`/`nin`/`or`/`and` into one-element sequences.
//!
//! Known limitation: a keyed structure whose keys are all decimal integers
//! is always read as an encoded sequence, so a field literally named `"0"`
//! cannot be told apart from the artifact.

use std::cmp::Ordering;

use filterq_core::op::requires_sequence;
use filterq_core::value::{Map, Value};

/// Rebuild `tree` in canonical form. Never fails; unknown shapes pass through.
pub fn normalize(tree: &Value) -> Value {
    match tree {
        Value::List(items) => Value::List(items.iter().map(normalize).collect()),
        Value::Map(map) if is_index_keyed(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| decimal_cmp(a, b));

            #[cfg(feature = "tracing")]
            tracing::trace!(len = entries.len(), "index-keyed map read as sequence");

            Value::List(entries.into_iter().map(|(_, v)| normalize(v)).collect())
        }
        Value::Map(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                let value = normalize(value);
                let value = if requires_sequence(key) && !value.is_list() {
                    Value::List(vec![value])
                } else {
                    value
                };
                out.insert(key.clone(), value);
            }
            Value::Map(out)
        }
        scalar => scalar.clone(),
    }
}

/// Non-empty and every key matches `^\d+$`.
fn is_index_keyed(map: &Map) -> bool {
    !map.is_empty()
        && map
            .keys()
            .all(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
}

/// Numeric order of two decimal strings without parsing (no overflow).
fn decimal_cmp(a: &str, b: &str) -> Ordering {
    let a_digits = a.trim_start_matches('0');
    let b_digits = b.trim_start_matches('0');
    a_digits
        .len()
        .cmp(&b_digits.len())
        .then_with(|| a_digits.cmp(b_digits))
        .then_with(|| a.cmp(b))
}
