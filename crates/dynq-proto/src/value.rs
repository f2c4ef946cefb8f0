//! Runtime value types for field values and comparison operands.

use std::fmt;

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A runtime value read off a record or supplied by a criterion.
///
/// This enum represents every value a filter can compare. It maps to the
/// scalar types of a record-type descriptor.
///
/// Note: Arrays are typed (e.g., BoolArray, Int32Array) to avoid recursive
/// type issues with rkyv serialization.
#[derive(
    Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub enum Value {
    /// Null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Timestamp as microseconds since Unix epoch.
    Timestamp(i64),
    /// UUID as 16 bytes.
    Uuid([u8; 16]),
    /// Array of booleans.
    BoolArray(Vec<bool>),
    /// Array of 32-bit integers.
    Int32Array(Vec<i32>),
    /// Array of 64-bit integers.
    Int64Array(Vec<i64>),
    /// Array of 32-bit floats.
    Float32Array(Vec<f32>),
    /// Array of 64-bit floats.
    Float64Array(Vec<f64>),
    /// Array of strings.
    StringArray(Vec<String>),
    /// Array of UUIDs.
    UuidArray(Vec<[u8; 16]>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is an array type.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Value::BoolArray(_)
                | Value::Int32Array(_)
                | Value::Int64Array(_)
                | Value::Float32Array(_)
                | Value::Float64Array(_)
                | Value::StringArray(_)
                | Value::UuidArray(_)
        )
    }

    /// Check if this value is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int32(_) | Value::Int64(_) | Value::Float32(_) | Value::Float64(_)
        )
    }

    /// Number of elements if this is an array.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::BoolArray(v) => Some(v.len()),
            Value::Int32Array(v) => Some(v.len()),
            Value::Int64Array(v) => Some(v.len()),
            Value::Float32Array(v) => Some(v.len()),
            Value::Float64Array(v) => Some(v.len()),
            Value::StringArray(v) => Some(v.len()),
            Value::UuidArray(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::BoolArray(_) => "bool[]",
            Value::Int32Array(_) => "int32[]",
            Value::Int64Array(_) => "int64[]",
            Value::Float32Array(_) => "float32[]",
            Value::Float64Array(_) => "float64[]",
            Value::StringArray(_) => "string[]",
            Value::UuidArray(_) => "uuid[]",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Int32(i) => Some(*i as i64),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(f) => Some(*f),
            Value::Float32(f) => Some(*f as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes reference.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as timestamp.
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Try to get as UUID.
    pub fn as_uuid(&self) -> Option<&[u8; 16]> {
        match self {
            Value::Uuid(u) => Some(u),
            _ => None,
        }
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str(&hex::encode(bytes))
}

fn write_uuid(f: &mut fmt::Formatter<'_>, uuid: &[u8; 16]) -> fmt::Result {
    write_hex(f, &uuid[0..4])?;
    f.write_str("-")?;
    write_hex(f, &uuid[4..6])?;
    f.write_str("-")?;
    write_hex(f, &uuid[6..8])?;
    f.write_str("-")?;
    write_hex(f, &uuid[8..10])?;
    f.write_str("-")?;
    write_hex(f, &uuid[10..16])
}

fn write_list<T, F>(f: &mut fmt::Formatter<'_>, items: &[T], mut item: F) -> fmt::Result
where
    F: FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
{
    f.write_str("[")?;
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item(f, v)?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => {
                f.write_str("0x")?;
                write_hex(f, b)
            }
            Value::Timestamp(t) => write!(f, "{}", t),
            Value::Uuid(u) => write_uuid(f, u),
            Value::BoolArray(v) => write_list(f, v, |f, x| write!(f, "{}", x)),
            Value::Int32Array(v) => write_list(f, v, |f, x| write!(f, "{}", x)),
            Value::Int64Array(v) => write_list(f, v, |f, x| write!(f, "{}", x)),
            Value::Float32Array(v) => write_list(f, v, |f, x| write!(f, "{}", x)),
            Value::Float64Array(v) => write_list(f, v, |f, x| write!(f, "{}", x)),
            Value::StringArray(v) => write_list(f, v, |f, x| write!(f, "{:?}", x)),
            Value::UuidArray(v) => write_list(f, v, write_uuid),
        }
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Value::BoolArray(v)
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Value::Int32Array(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Int64Array(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Float64Array(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StringArray(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::StringArray(v.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
