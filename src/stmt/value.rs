use crate::{codec, Error, Result};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use std::any::Any;
use std::sync::Arc;

/// A value bound to or read from a statement.
///
/// The first five variants map one-to-one to SQLite's storage classes. `Any`
/// wraps a value the store cannot natively represent; it is encoded through a
/// registered adapter when bound and produced by a registered converter when
/// read back (see [`codec`]).
#[derive(Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Any(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wraps a value that needs a registered adapter to reach the store.
    pub fn any<T: Any + Send + Sync>(value: T) -> Value {
        Value::Any(Arc::new(value))
    }

    /// The variant name, used in conversion error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Integer(_) => "Integer",
            Value::Real(_) => "Real",
            Value::Text(_) => "Text",
            Value::Blob(_) => "Blob",
            Value::Any(_) => "Any",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(value) => Some(value),
            _ => None,
        }
    }

    /// Borrows the wrapped value if this is `Any` holding a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Any(value) => value.downcast_ref(),
            _ => None,
        }
    }

    /// Converts into an `i64`, failing with a type conversion error.
    pub fn into_integer(self) -> Result<i64> {
        self.as_integer()
            .ok_or_else(|| Error::type_conversion(self.name(), "i64"))
    }

    /// Converts into a `f64`, failing with a type conversion error.
    pub fn into_real(self) -> Result<f64> {
        self.as_real()
            .ok_or_else(|| Error::type_conversion(self.name(), "f64"))
    }

    /// Converts into a `String`, failing with a type conversion error.
    pub fn into_text(self) -> Result<String> {
        match self {
            Value::Text(value) => Ok(value),
            other => Err(Error::type_conversion(other.name(), "String")),
        }
    }

    /// Converts into a `Vec<u8>`, failing with a type conversion error.
    pub fn into_blob(self) -> Result<Vec<u8>> {
        match self {
            Value::Blob(value) => Ok(value),
            other => Err(Error::type_conversion(other.name(), "Vec<u8>")),
        }
    }

    /// Extracts a clone of the wrapped `T` from an `Any` value.
    pub fn into_any<T: Any + Clone>(self) -> Result<T> {
        self.downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| Error::type_conversion(self.name(), std::any::type_name::<T>()))
    }

    /// Reads the value at `index` of a row, mapped by storage class.
    pub(crate) fn from_sql(row: &rusqlite::Row<'_>, index: usize) -> Result<Value> {
        let value = match row.get_ref(index)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(value) => Value::Integer(value),
            ValueRef::Real(value) => Value::Real(value),
            ValueRef::Text(value) => Value::Text(
                String::from_utf8(value.to_vec())
                    .map_err(|_| Error::type_conversion("Text", "utf-8 string"))?,
            ),
            ValueRef::Blob(value) => Value::Blob(value.to_vec()),
        };
        Ok(value)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            Value::Integer(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::Real(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::Text(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Blob(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Value::Any(v) => {
                let encoded = codec::encode(&**v)
                    .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
                match encoded {
                    Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
                    Value::Integer(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(v))),
                    Value::Real(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(v))),
                    Value::Text(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v))),
                    Value::Blob(v) => Ok(ToSqlOutput::Owned(SqlValue::Blob(v))),
                    Value::Any(_) => Err(rusqlite::Error::ToSqlConversionFailure(Box::new(
                        Error::type_conversion("Any", "sqlite value"),
                    ))),
                }
            }
        }
    }
}

impl core::fmt::Debug for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Value::Real(v) => f.debug_tuple("Real").field(v).finish(),
            Value::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Value::Blob(v) => f.debug_tuple("Blob").field(&v.len()).finish(),
            Value::Any(_) => f.write_str("Any(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            // Wrapped values compare by identity only
            (Value::Any(a), Value::Any(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Value {
        Value::Integer(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Value {
        Value::Integer(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Value {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Value {
        Value::Blob(value.to_vec())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Value {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}
