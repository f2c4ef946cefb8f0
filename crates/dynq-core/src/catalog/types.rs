//! Core type definitions for the catalog.

use std::fmt;
use std::str::FromStr;

use dynq_proto::{Error as ProtoError, Value};
use serde::{Deserialize, Serialize};

/// Scalar data types a record field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

/// Field types - flat representation without recursion.
///
/// Serialized as a compact string: `"string"`, `"int32?"` (nullable),
/// `"string[]"` (array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarType),
    /// An optional scalar value (nullable).
    OptionalScalar(ScalarType),
    /// An array of scalar values.
    ArrayScalar(ScalarType),
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32 | ScalarType::Int64 | ScalarType::Float32 | ScalarType::Float64
        )
    }

    /// Check if this type is a string-like type.
    pub fn is_string_like(&self) -> bool {
        matches!(self, ScalarType::String | ScalarType::Bytes)
    }

    /// Check if values of this type support `<`, `>`, `<=` and `>=`.
    ///
    /// Strings have no ordering operators; use the substring operators instead.
    pub fn is_orderable(&self) -> bool {
        self.is_numeric() || matches!(self, ScalarType::Timestamp)
    }

    /// Lowercase name used in schemas.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Uuid => "uuid",
        }
    }

    /// Check if a scalar value can be compared with a field of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ScalarType::Int32 | ScalarType::Int64 | ScalarType::Float32 | ScalarType::Float64 => {
                value.is_numeric()
            }
            ScalarType::Bool => matches!(value, Value::Bool(_)),
            ScalarType::String => matches!(value, Value::String(_)),
            ScalarType::Bytes => matches!(value, Value::Bytes(_)),
            ScalarType::Timestamp => matches!(value, Value::Timestamp(_)),
            ScalarType::Uuid => matches!(value, Value::Uuid(_)),
        }
    }

    /// Check if an array value holds elements of this type.
    fn accepts_array(&self, value: &Value) -> bool {
        match self {
            ScalarType::Int32 | ScalarType::Int64 | ScalarType::Float32 | ScalarType::Float64 => {
                matches!(
                    value,
                    Value::Int32Array(_)
                        | Value::Int64Array(_)
                        | Value::Float32Array(_)
                        | Value::Float64Array(_)
                )
            }
            ScalarType::Bool => matches!(value, Value::BoolArray(_)),
            ScalarType::String => matches!(value, Value::StringArray(_)),
            ScalarType::Uuid => matches!(value, Value::UuidArray(_)),
            ScalarType::Bytes | ScalarType::Timestamp => false,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(ScalarType::Bool),
            "int32" | "int" | "i32" => Ok(ScalarType::Int32),
            "int64" | "long" | "i64" => Ok(ScalarType::Int64),
            "float32" | "float" | "f32" => Ok(ScalarType::Float32),
            "float64" | "double" | "f64" => Ok(ScalarType::Float64),
            "string" | "str" => Ok(ScalarType::String),
            "bytes" => Ok(ScalarType::Bytes),
            "timestamp" => Ok(ScalarType::Timestamp),
            "uuid" => Ok(ScalarType::Uuid),
            _ => Err(ProtoError::InvalidFieldType(s.to_string())),
        }
    }
}

impl FieldType {
    /// Create a scalar field type.
    pub fn scalar(scalar: ScalarType) -> Self {
        FieldType::Scalar(scalar)
    }

    /// Create an optional scalar field type.
    pub fn optional_scalar(scalar: ScalarType) -> Self {
        FieldType::OptionalScalar(scalar)
    }

    /// Create an array of scalars field type.
    pub fn array_scalar(scalar: ScalarType) -> Self {
        FieldType::ArrayScalar(scalar)
    }

    /// Check if this type is nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::OptionalScalar(_))
    }

    /// Check if this type is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::ArrayScalar(_))
    }

    /// Get the scalar (or element) type.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            FieldType::Scalar(s) | FieldType::OptionalScalar(s) | FieldType::ArrayScalar(s) => *s,
        }
    }

    /// Check if ordering operators apply to this type.
    pub fn is_orderable(&self) -> bool {
        !self.is_array() && self.scalar_type().is_orderable()
    }

    /// Check if the null/empty/whitespace operators apply to this type.
    pub fn supports_emptiness(&self) -> bool {
        self.is_array() || self.scalar_type().is_string_like()
    }

    /// Check if `value` is a valid equality or ordering operand for this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::OptionalScalar(_), Value::Null) => true,
            (FieldType::ArrayScalar(s), v) => s.accepts_array(v),
            (FieldType::Scalar(s) | FieldType::OptionalScalar(s), v) => s.accepts(v),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{}", s),
            FieldType::OptionalScalar(s) => write!(f, "{}?", s),
            FieldType::ArrayScalar(s) => write!(f, "{}[]", s),
        }
    }
}

impl FromStr for FieldType {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if let Some(inner) = s.strip_suffix("[]") {
            inner.parse().map(FieldType::ArrayScalar)
        } else if let Some(inner) = s.strip_suffix('?') {
            inner.parse().map(FieldType::OptionalScalar)
        } else {
            s.parse().map(FieldType::Scalar)
        };
        parsed.map_err(|_| ProtoError::InvalidFieldType(s.to_string()))
    }
}

impl TryFrom<String> for FieldType {
    type Error = ProtoError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.to_string()
    }
}
