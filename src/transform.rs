//! Operator transforms: one script fragment builder per update operator.
//!
//! Every builder walks its operation's fields in order and returns the
//! fragments for that operation, one per field or per `$each` element.
//! Paths are parsed before anything is rendered for a field, so a `$`
//! segment fails the operation without output.

use crate::error::{DocsyncError, Result};
use crate::literal::{render_literal, render_quoted, render_string};
use crate::mutator::{Operand, Operation, Operator};
use crate::path::FieldPath;
use indexmap::IndexMap;
use serde_json::Value;

type Fields = IndexMap<String, Operand>;

/// Build the ordered script fragments for one operation.
pub fn fragments(operation: &Operation) -> Result<Vec<String>> {
    let fields = &operation.fields;
    match operation.operator {
        Operator::Set => set(fields),
        Operator::Unset => unset(fields),
        Operator::Inc => inc(fields),
        Operator::Push => append(Operator::Push, fields),
        Operator::Pull => append(Operator::Pull, fields),
        Operator::PullAll => pull_all(fields),
        Operator::AddToSet => add_to_set(fields),
    }
}

fn set(fields: &Fields) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(fields.len());
    for (raw, operand) in fields {
        let path = FieldPath::parse(raw)?;
        let literal = match operand {
            Operand::Scalar(v) => render_literal(v),
            Operand::Object(obj) => render_literal(&Value::Object(obj.clone())),
            Operand::Array(items) => render_literal(&Value::Array(items.clone())),
            Operand::Each(_) => {
                return Err(invalid(Operator::Set, raw, "$each is not supported here"));
            }
        }
        .ok_or_else(|| {
            invalid(Operator::Set, raw, "nested objects and arrays have no literal")
        })?;
        out.push(format!("{} = {}", path.accessor(), literal));
    }
    Ok(out)
}

fn unset(fields: &Fields) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(fields.len());
    for raw in fields.keys() {
        let path = FieldPath::parse(raw)?;
        let fragment = match path.split_leaf() {
            Some((parent, leaf)) => format!("{}.remove({})", parent, render_string(&leaf)),
            None => format!("{}.remove({})", crate::path::SOURCE_ROOT, render_string(raw)),
        };
        out.push(fragment);
    }
    Ok(out)
}

fn inc(fields: &Fields) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(fields.len());
    for (raw, operand) in fields {
        let path = FieldPath::parse(raw)?;
        let amount = match operand {
            Operand::Scalar(Value::Number(n)) => n.to_string(),
            _ => return Err(invalid(Operator::Inc, raw, "expected a number")),
        };
        out.push(format!("{}+={}", path.accessor(), amount));
    }
    Ok(out)
}

/// `$push` (`+=`) and `$pull` (`-=`), with or without `$each`.
fn append(operator: Operator, fields: &Fields) -> Result<Vec<String>> {
    let assign = if operator == Operator::Pull { "-=" } else { "+=" };
    let mut out = Vec::with_capacity(fields.len());
    for (raw, operand) in fields {
        let path = FieldPath::parse(raw)?;
        let accessor = path.accessor();
        let elements: &[Value] = match operand {
            Operand::Each(items) => items,
            Operand::Scalar(v) => std::slice::from_ref(v),
            Operand::Object(_) | Operand::Array(_) => {
                return Err(invalid(
                    operator,
                    raw,
                    "expected a scalar or an $each list of scalars",
                ));
            }
        };
        for element in elements {
            let value = quoted(operator, raw, element)?;
            out.push(format!("{}{}{}", accessor, assign, value));
        }
    }
    Ok(out)
}

fn pull_all(fields: &Fields) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(fields.len());
    for (raw, operand) in fields {
        let path = FieldPath::parse(raw)?;
        let accessor = path.accessor();
        let elements: &[Value] = match operand {
            Operand::Array(items) => items,
            Operand::Scalar(v) => std::slice::from_ref(v),
            Operand::Object(_) | Operand::Each(_) => {
                return Err(invalid(Operator::PullAll, raw, "expected a list of scalars"));
            }
        };
        for element in elements {
            let value = quoted(Operator::PullAll, raw, element)?;
            out.push(format!("{}-={}", accessor, value));
        }
    }
    Ok(out)
}

fn add_to_set(fields: &Fields) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(fields.len());
    for (raw, operand) in fields {
        let path = FieldPath::parse(raw)?;
        let accessor = path.accessor();
        let elements: &[Value] = match operand {
            Operand::Each(items) => items,
            Operand::Scalar(v) => std::slice::from_ref(v),
            Operand::Object(_) | Operand::Array(_) => {
                return Err(invalid(
                    Operator::AddToSet,
                    raw,
                    "expected a scalar or an $each list of scalars",
                ));
            }
        };
        for (i, element) in elements.iter().enumerate() {
            let value = quoted(Operator::AddToSet, raw, element)?;
            if i == 0 {
                out.push(add_to_set_first(&accessor, &value));
            } else {
                out.push(add_to_set_next(&accessor, &value));
            }
        }
    }
    Ok(out)
}

// The first element also has to create the list when the field is missing.
fn add_to_set_first(accessor: &str, value: &str) -> String {
    format!(
        "if (!{a}) {{  {a} = [{v}];}} else if (!{a}.contains({v})) {{  {a} += {v};}}",
        a = accessor,
        v = value
    )
}

fn add_to_set_next(accessor: &str, value: &str) -> String {
    format!(
        "if (!{a}.contains({v})) {{  {a} += {v};}}",
        a = accessor,
        v = value
    )
}

fn quoted(operator: Operator, field: &str, element: &Value) -> Result<String> {
    render_quoted(element)
        .ok_or_else(|| invalid(operator, field, "elements must be strings, numbers or booleans"))
}

fn invalid(operator: Operator, field: &str, reason: &str) -> DocsyncError {
    DocsyncError::InvalidOperand {
        operator: operator.name().to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
