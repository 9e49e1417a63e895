//! Update mutators: `{"$set": {"profile.name": "John"}, "$inc": {"score": 1}}`.
//!
//! A [`Mutator`] keeps operators and fields in the order they were written;
//! that order is the order of the generated script statements.

use crate::error::{DocsyncError, Result};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

const EACH: &str = "$each";

/// The closed set of supported update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Set,
    Unset,
    Inc,
    Push,
    Pull,
    PullAll,
    AddToSet,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Set,
        Operator::Unset,
        Operator::Inc,
        Operator::Push,
        Operator::Pull,
        Operator::PullAll,
        Operator::AddToSet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operator::Set => "$set",
            Operator::Unset => "$unset",
            Operator::Inc => "$inc",
            Operator::Push => "$push",
            Operator::Pull => "$pull",
            Operator::PullAll => "$pullAll",
            Operator::AddToSet => "$addToSet",
        }
    }

    /// # Errors
    ///
    /// [`DocsyncError::UnsupportedOperator`] for any name outside the set.
    pub fn from_name(name: &str) -> Result<Self> {
        Operator::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| DocsyncError::UnsupportedOperator(name.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value attached to one field within one operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// String, number, boolean or null.
    Scalar(Value),
    Object(Map<String, Value>),
    Array(Vec<Value>),
    /// `{"$each": [...]}`: apply the operator once per element.
    Each(Vec<Value>),
}

impl Operand {
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Object(obj) if obj.contains_key(EACH) => {
                if obj.len() != 1 {
                    return Err(DocsyncError::InvalidMutator(
                        "$each cannot be combined with other modifiers".to_string(),
                    ));
                }
                match &obj[EACH] {
                    Value::Array(items) => Ok(Operand::Each(items.clone())),
                    _ => Err(DocsyncError::InvalidMutator(
                        "$each expects an array".to_string(),
                    )),
                }
            }
            Value::Object(obj) => Ok(Operand::Object(obj.clone())),
            Value::Array(items) => Ok(Operand::Array(items.clone())),
            other => Ok(Operand::Scalar(other.clone())),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Operand::Scalar(v) => v.clone(),
            Operand::Object(obj) => Value::Object(obj.clone()),
            Operand::Array(items) => Value::Array(items.clone()),
            Operand::Each(items) => {
                let mut obj = Map::new();
                obj.insert(EACH.to_string(), Value::Array(items.clone()));
                Value::Object(obj)
            }
        }
    }
}

/// One operator and its ordered field → operand map.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: Operator,
    pub fields: IndexMap<String, Operand>,
}

impl Operation {
    pub fn new(operator: Operator) -> Self {
        Operation {
            operator,
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, path: impl Into<String>, operand: Operand) -> Self {
        self.fields.insert(path.into(), operand);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mutator {
    operations: Vec<Operation>,
}

impl Mutator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation. A second operation with the same operator
    /// replaces the fields of the first one, keeping its position.
    pub fn with(mut self, operation: Operation) -> Self {
        self.push(operation);
        self
    }

    pub fn push(&mut self, operation: Operation) {
        match self
            .operations
            .iter_mut()
            .find(|op| op.operator == operation.operator)
        {
            Some(existing) => existing.fields = operation.fields,
            None => self.operations.push(operation),
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Parse a mutator object, preserving key order.
    ///
    /// # Errors
    ///
    /// [`DocsyncError::UnsupportedOperator`] for the first unknown operator,
    /// [`DocsyncError::InvalidMutator`] if the value is not an object of
    /// objects.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            DocsyncError::InvalidMutator("expected a JSON object of operators".to_string())
        })?;

        let mut operations = Vec::with_capacity(obj.len());
        for (name, params) in obj {
            let operator = Operator::from_name(name)?;
            let params = params.as_object().ok_or_else(|| {
                DocsyncError::InvalidMutator(format!(
                    "{} expects an object of field paths",
                    operator
                ))
            })?;

            let mut fields = IndexMap::with_capacity(params.len());
            for (path, operand) in params {
                fields.insert(path.clone(), Operand::from_json(operand)?);
            }
            operations.push(Operation { operator, fields });
        }

        Ok(Mutator { operations })
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for op in &self.operations {
            let mut params = Map::new();
            for (path, operand) in &op.fields {
                params.insert(path.clone(), operand.to_json());
            }
            obj.insert(op.operator.name().to_string(), Value::Object(params));
        }
        Value::Object(obj)
    }
}
