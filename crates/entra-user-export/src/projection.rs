//! Projection of records down to the requested keys.

use serde_json::{Map, Value};

use crate::fields::CORE_FIELDS;
use crate::selection::Selection;

/// Copies core keys, then selected keys, out of a normalized record.
///
/// Missing keys come out as `null`.
#[must_use]
pub fn project(normalized: &Map<String, Value>, selection: &Selection) -> Map<String, Value> {
    projected_keys(selection)
        .map(|key| {
            let value = normalized.get(key).cloned().unwrap_or(Value::Null);
            (key.to_string(), value)
        })
        .collect()
}

/// Best-effort projection straight from a raw record, used for error
/// records. A non-object record yields all `null`s.
#[must_use]
pub fn project_raw(raw: &Value, selection: &Selection) -> Map<String, Value> {
    projected_keys(selection)
        .map(|key| (key.to_string(), raw.get(key).cloned().unwrap_or(Value::Null)))
        .collect()
}

fn projected_keys(selection: &Selection) -> impl Iterator<Item = &'static str> + '_ {
    CORE_FIELDS.into_iter().chain(selection.keys())
}
