//! Document ids named directly by a query selector.

use crate::types::DocumentId;
use serde_json::Value;

pub const ID_KEY: &str = "_id";
const IN: &str = "$in";

/// Ids named by `{"_id": "x"}` or `{"_id": {"$in": ["x", "y"]}}`.
///
/// `$in` lists are returned as written, duplicates included. Any other
/// selector shape returns `None`: the ids have to be looked up elsewhere.
pub fn extract_ids(selector: &Value) -> Option<Vec<DocumentId>> {
    let id = selector.as_object()?.get(ID_KEY)?;

    if let Some(single) = scalar_id(id) {
        return Some(vec![single]);
    }

    let list = id.as_object()?.get(IN)?.as_array()?;
    list.iter().map(scalar_id).collect()
}

fn scalar_id(value: &Value) -> Option<DocumentId> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
