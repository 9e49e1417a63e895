//! Script literal rendering.
//!
//! Scripts are Groovy, so `$` is escaped in every string literal to keep
//! it from starting an interpolation. Only flat values are rendered: an
//! array or object nested inside another array or object has no literal.

use serde_json::Value;

/// Render a value as a script literal for assignment.
///
/// Strings are quoted, numbers verbatim, arrays as `[a,b]` and objects as
/// `["k":v]` (`[:]` when empty). Returns `None` when an array or object
/// contains another array or object.
pub fn render_literal(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts = items.iter().map(render_scalar).collect::<Option<Vec<_>>>()?;
            Some(format!("[{}]", parts.join(",")))
        }
        Value::Object(map) if map.is_empty() => Some("[:]".to_string()),
        Value::Object(map) => {
            let parts = map
                .iter()
                .map(|(k, v)| Some(format!("{}:{}", render_string(k), render_scalar(v)?)))
                .collect::<Option<Vec<_>>>()?;
            Some(format!("[{}]", parts.join(",")))
        }
        scalar => render_scalar(scalar),
    }
}

/// Render a value as a quoted script string, the form list operators append
/// and remove. Numbers and booleans are quoted in their textual form.
/// Returns `None` for null, arrays and objects.
pub fn render_quoted(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(render_string(s)),
        Value::Number(n) => Some(render_string(&n.to_string())),
        Value::Bool(b) => Some(render_string(&b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Double-quoted string literal.
pub fn render_string(s: &str) -> String {
    Value::String(s.to_string()).to_string().replace('$', "\\$")
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(render_string(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
