//! Default template for the selected fields.

use serde_json::{json, Map, Value};

use crate::fields::{FieldKind, UserField, CORE_FIELDS};
use crate::selection::Selection;

/// Nested mapping of key to default value.
pub type Template = Map<String, Value>;

/// Sub-fields of `signInActivity` and whether each holds a timestamp.
const SIGN_IN_ACTIVITY_FIELDS: [(&str, bool); 6] = [
    ("lastSignInDateTime", true),
    ("lastSignInRequestId", false),
    ("lastNonInteractiveSignInDateTime", true),
    ("lastNonInteractiveSignInRequestId", false),
    ("lastSuccessfulSignInDateTime", true),
    ("lastSuccessfulSignInRequestId", false),
];

/// Builds the default template: core keys first, then the selected fields.
///
/// Fields that are not selected are absent from the template.
#[must_use]
pub fn build_template(selection: &Selection) -> Template {
    let mut template = Template::new();

    for key in CORE_FIELDS {
        template.insert(key.to_string(), Value::String(String::new()));
    }

    for field in selection.fields() {
        template.insert(field.key().to_string(), default_value(*field));
    }

    template
}

/// Zero value for one optional field.
#[must_use]
pub fn default_value(field: UserField) -> Value {
    match field.kind() {
        FieldKind::Boolean => Value::Bool(false),
        FieldKind::Timestamp => Value::Null,
        FieldKind::String => Value::String(String::new()),
        FieldKind::List => json!([]),
        FieldKind::Composite => sign_in_activity_default(),
    }
}

fn sign_in_activity_default() -> Value {
    let nested: Map<String, Value> = SIGN_IN_ACTIVITY_FIELDS
        .iter()
        .map(|(key, is_timestamp)| {
            let value = if *is_timestamp {
                Value::Null
            } else {
                Value::String(String::new())
            };
            ((*key).to_string(), value)
        })
        .collect();
    Value::Object(nested)
}
