//! Recursive default merging.
//!
//! The merge is structural and type-oblivious: a raw value of any type
//! replaces a default of another type (a string may replace `[]`). Only a
//! nested template object forces recursion, and a non-object raw value at
//! that position is treated as an empty object.

use serde_json::{Map, Value};

/// Merges `source` over `template`, template keys first.
///
/// Every template key is present in the output. Keys that only exist in
/// `source` are carried through after them. A non-object `source` behaves
/// like `{}`.
#[must_use]
pub fn merge_defaults(template: &Map<String, Value>, source: &Value) -> Map<String, Value> {
    let empty = Map::new();
    let source = source.as_object().unwrap_or(&empty);

    let mut merged = Map::with_capacity(template.len() + source.len());

    for (key, default) in template {
        let value = match default {
            Value::Object(nested) => {
                let nested_source = source.get(key).unwrap_or(&Value::Null);
                Value::Object(merge_defaults(nested, nested_source))
            }
            _ => source.get(key).cloned().unwrap_or_else(|| default.clone()),
        };
        merged.insert(key.clone(), value);
    }

    for (key, value) in source {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    merged
}
