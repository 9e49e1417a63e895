//! Allow-list filtering of mutators and documents by top-level field.

use crate::mutator::{Mutator, Operation};
use crate::selector::ID_KEY;
use serde_json::{Map, Value};

/// Keep only the fields of `mutator` whose first path segment is allowed.
///
/// Operators left without fields are dropped, so an empty result means the
/// update touches nothing that is mirrored.
pub fn filter_mutator(mutator: &Mutator, allowed: &[String]) -> Mutator {
    let mut filtered = Mutator::new();
    for operation in mutator.operations() {
        let fields: indexmap::IndexMap<_, _> = operation
            .fields
            .iter()
            .filter(|(path, _)| is_allowed(path, allowed))
            .map(|(path, operand)| (path.clone(), operand.clone()))
            .collect();
        if !fields.is_empty() {
            filtered.push(Operation {
                operator: operation.operator,
                fields,
            });
        }
    }
    filtered
}

/// Keep only the allowed top-level keys of a document. `_id` is always kept.
pub fn filter_document(doc: &Map<String, Value>, allowed: &[String]) -> Map<String, Value> {
    doc.iter()
        .filter(|(key, _)| key.as_str() == ID_KEY || allowed.iter().any(|a| a == *key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn is_allowed(path: &str, allowed: &[String]) -> bool {
    let top = path.split('.').next().unwrap_or(path);
    allowed.iter().any(|a| a == top)
}
