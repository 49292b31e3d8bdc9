// `images_id` list maintenance for documents that reference uploaded images

use serde_json::Value;

use crate::db::Fields;

pub const IMAGES_FIELD: &str = "images_id";

/// Current image identifiers of a document; non-string entries are dropped
pub fn current_ids(fields: &Fields) -> Vec<String> {
    fields
        .get(IMAGES_FIELD)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Strict reading of a client-supplied `images_id`: an array of strings,
/// duplicates dropped. `None` for any other shape.
pub fn parse_ids(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let ids = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<String>>>()?;
    Some(add_ids(Vec::new(), &ids))
}

/// Append ids not already present, keeping first-seen order
pub fn add_ids(current: Vec<String>, incoming: &[String]) -> Vec<String> {
    let mut ids = current;
    for id in incoming {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    ids
}

/// Drop every id listed in `outgoing`; ids that are not present are ignored
pub fn remove_ids(current: Vec<String>, outgoing: &[String]) -> Vec<String> {
    current
        .into_iter()
        .filter(|id| !outgoing.contains(id))
        .collect()
}

/// Patch that replaces the `images_id` field
pub fn images_patch(ids: Vec<String>) -> Fields {
    let mut patch = Fields::new();
    patch.insert(
        IMAGES_FIELD.to_string(),
        Value::Array(ids.into_iter().map(Value::String).collect()),
    );
    patch
}
