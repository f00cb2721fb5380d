//! Value types for SQL parameters and result rows

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A bound parameter, or one cell read back from a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Bound as SQL `NULL`; also what `()` and `None` convert to
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    /// BLOB cells; serialized to JSON as a list of byte values
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    /// Never bound directly: IN / NOT IN expand it into one `?` per
    /// element
    Array(Vec<Value>),
}

impl Value {
    /// Integer view of the value, widening `I32` and `Bool`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(i) => Some(i64::from(*i)),
            Value::I64(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to `serde_json::Value`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::I32(i) => serde_json::Value::from(*i),
            Value::I64(i) => serde_json::Value::from(*i),
            Value::F32(f) => serde_json::Number::from_f64(f64::from(*f))
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::F64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::Array(
                b.iter().map(|byte| serde_json::Value::from(*byte)).collect(),
            ),
            Value::Json(j) => j.clone(),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Value::to_json).collect()),
        }
    }
}

macro_rules! impl_from_scalar {
    ($source:ty, $into:path) => {
        impl From<$source> for Value {
            fn from(val: $source) -> Self {
                $into(val)
            }
        }
    };
}

impl_from_scalar!(bool, Value::Bool);
impl_from_scalar!(i32, Value::I32);
impl_from_scalar!(i64, Value::I64);
impl_from_scalar!(f32, Value::F32);
impl_from_scalar!(f64, Value::F64);
impl_from_scalar!(String, Value::String);
impl_from_scalar!(serde_json::Value, Value::Json);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::from(items.to_vec())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// `None` binds as `NULL`
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(item: Option<T>) -> Self {
        item.map_or(Value::Null, Into::into)
    }
}

/// One result row: column names alongside positional values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Value at a column position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the first column with this name
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|column| column == name)
            .and_then(|index| self.values.get(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Decode the row into a serde type, keyed by column name.
    ///
    /// # Examples
    /// ```
    /// use quill_core::{Row, Value};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct User {
    ///     id: i64,
    ///     name: String,
    /// }
    ///
    /// let row = Row::new(
    ///     vec!["id".into(), "name".into()],
    ///     vec![Value::I64(7), Value::from("Ada")],
    /// );
    /// let user: User = row.deserialize().unwrap();
    /// assert_eq!(user.id, 7);
    /// assert_eq!(user.name, "Ada");
    /// ```
    pub fn deserialize<T>(&self) -> crate::Result<T>
    where
        T: DeserializeOwned,
    {
        let object: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .cloned()
            .zip(self.values.iter().map(Value::to_json))
            .collect();
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}
