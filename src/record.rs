//! Records are field → value mappings whose keys are checked against a [`Schema`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::StoreError;

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    /// Enumerated value such as a user role.
    Category(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn category(s: impl Into<String>) -> Self {
        Value::Category(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Category(s) => f.write_str(s),
            // Whole numbers print without a fractional part: 127, not 127.0
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

/// The ordered set of field names a table's records may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(fields: I) -> Result<Arc<Self>, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declared: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if declared.contains(&field) {
                return Err(StoreError::DuplicateField { field });
            }
            declared.push(field);
        }
        Ok(Arc::new(Schema { fields: declared }))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Build a record, rejecting keys the schema does not declare.
    /// Declared fields may be left out; they read back as missing.
    pub fn record<I, K, V>(self: &Arc<Self>, pairs: I) -> Result<Record, StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut values = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            if !self.contains(&key) {
                return Err(StoreError::UnknownField { field: key });
            }
            values.insert(key, value.into());
        }
        Ok(Record {
            schema: Arc::clone(self),
            values,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Fields that carry a value.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Stringified value, `None` when the field is absent.
    pub fn get_string(&self, field: &str) -> Option<String> {
        self.get(field).map(|v| v.to_string())
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), StoreError> {
        if !self.schema.contains(field) {
            return Err(StoreError::UnknownField {
                field: field.to_string(),
            });
        }
        self.values.insert(field.to_string(), value.into());
        Ok(())
    }

    /// Stable row identifier, taken from the `id` field when present.
    pub fn id(&self) -> Option<String> {
        self.get_string("id")
    }
}
