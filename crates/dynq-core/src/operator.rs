//! Operator semantics.
//!
//! Every [`Operator`] maps to a plain function of the field value and the
//! comparison value. The functions are total: operand types an operator is not
//! designed for produce `false` instead of an error, so a misapplied operator
//! excludes the record rather than aborting the filter.
//!
//! The negated pattern operators (`DoesNotContain`, `DoesNotStartWith`,
//! `DoesNotEndWith`) only negate inside their supported branches. For
//! unsupported operands they return `false`, just like their positive forms.
//! `NotLike` is the exception: it is the conjunction of three negated tests and
//! therefore returns `true` for unsupported operands.

use std::cmp::Ordering;

use dynq_proto::{Operator, Value};

/// Signature shared by all operator implementations: `(field value, comparison value)`.
pub type OperatorFn = fn(&Value, &Value) -> bool;

/// Select the implementation for an operator.
pub fn operator_fn(operator: Operator) -> OperatorFn {
    match operator {
        Operator::Equal => equal,
        Operator::NotEqual => not_equal,
        Operator::LessThan => less_than,
        Operator::GreaterThan => greater_than,
        Operator::LessThanEqual => less_than_equal,
        Operator::GreaterThanEqual => greater_than_equal,
        Operator::Contains => contains,
        Operator::DoesNotContain => does_not_contain,
        Operator::StartsWith => starts_with,
        Operator::DoesNotStartWith => does_not_start_with,
        Operator::EndsWith => ends_with,
        Operator::DoesNotEndWith => does_not_end_with,
        Operator::Like => like,
        Operator::NotLike => not_like,
        Operator::IsNullOrEmpty => is_null_or_empty,
        Operator::IsNotNullOrEmpty => is_not_null_or_empty,
        Operator::IsNullOrWhiteSpace => is_null_or_white_space,
        Operator::IsNotNullOrWhiteSpace => is_not_null_or_white_space,
    }
}

/// Apply an operator to a pair of values.
pub fn evaluate(operator: Operator, source: &Value, value: &Value) -> bool {
    operator_fn(operator)(source, value)
}

/// Fallback bound when an operator can never apply to a field type.
pub fn no_match(_source: &Value, _value: &Value) -> bool {
    false
}

pub fn equal(source: &Value, value: &Value) -> bool {
    values_equal(source, value)
}

pub fn not_equal(source: &Value, value: &Value) -> bool {
    !values_equal(source, value)
}

pub fn less_than(source: &Value, value: &Value) -> bool {
    compare_values(source, value).is_some_and(Ordering::is_lt)
}

pub fn greater_than(source: &Value, value: &Value) -> bool {
    compare_values(source, value).is_some_and(Ordering::is_gt)
}

pub fn less_than_equal(source: &Value, value: &Value) -> bool {
    compare_values(source, value).is_some_and(Ordering::is_le)
}

pub fn greater_than_equal(source: &Value, value: &Value) -> bool {
    compare_values(source, value).is_some_and(Ordering::is_ge)
}

/// Substring test for two strings, membership test for sequences.
pub fn contains(source: &Value, value: &Value) -> bool {
    if let Some((s, v)) = string_pair(source, value) {
        return s.contains(v);
    }
    sequence_contains(source, value).unwrap_or(false)
}

pub fn does_not_contain(source: &Value, value: &Value) -> bool {
    if let Some((s, v)) = string_pair(source, value) {
        return !s.contains(v);
    }
    sequence_contains(source, value).is_some_and(|found| !found)
}

pub fn starts_with(source: &Value, value: &Value) -> bool {
    string_pair(source, value).is_some_and(|(s, v)| s.starts_with(v))
}

pub fn does_not_start_with(source: &Value, value: &Value) -> bool {
    string_pair(source, value).is_some_and(|(s, v)| !s.starts_with(v))
}

pub fn ends_with(source: &Value, value: &Value) -> bool {
    string_pair(source, value).is_some_and(|(s, v)| s.ends_with(v))
}

pub fn does_not_end_with(source: &Value, value: &Value) -> bool {
    string_pair(source, value).is_some_and(|(s, v)| !s.ends_with(v))
}

pub fn like(source: &Value, value: &Value) -> bool {
    starts_with(source, value) || contains(source, value) || ends_with(source, value)
}

pub fn not_like(source: &Value, value: &Value) -> bool {
    !starts_with(source, value) && !contains(source, value) && !ends_with(source, value)
}

pub fn is_null_or_empty(source: &Value, _value: &Value) -> bool {
    emptiness(source, false).unwrap_or(false)
}

pub fn is_not_null_or_empty(source: &Value, _value: &Value) -> bool {
    emptiness(source, false).is_some_and(|empty| !empty)
}

pub fn is_null_or_white_space(source: &Value, _value: &Value) -> bool {
    emptiness(source, true).unwrap_or(false)
}

pub fn is_not_null_or_white_space(source: &Value, _value: &Value) -> bool {
    emptiness(source, true).is_some_and(|empty| !empty)
}

/// Check if two values are equal.
///
/// Numerics compare across widths; integers against floats compare as `f64`.
/// Numeric arrays compare element by element under the same rules.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bytes(a), Value::Bytes(b)) => a == b,
        (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
        (Value::Uuid(a), Value::Uuid(b)) => a == b,
        _ if a.is_numeric() && b.is_numeric() => compare_values(a, b) == Some(Ordering::Equal),
        _ if a.is_array() && b.is_array() => arrays_equal(a, b),
        _ => false,
    }
}

/// Compare two values, returning their ordering if comparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::Int32(a), Value::Int64(b)) => Some((*a as i64).cmp(b)),
        (Value::Int64(a), Value::Int32(b)) => Some(a.cmp(&(*b as i64))),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        // float32 fields compare at their own precision
        (Value::Float32(a), Value::Float64(b)) => a.partial_cmp(&(*b as f32)),
        (Value::Float64(a), Value::Float32(b)) => (*a as f32).partial_cmp(b),
        _ if a.is_numeric() && b.is_numeric() => as_f64(a)?.partial_cmp(&as_f64(b)?),
        _ => None, // Incompatible types
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int32(i) => Some(*i as f64),
        Value::Int64(i) => Some(*i as f64),
        other => other.as_f64(),
    }
}

fn arrays_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::BoolArray(a), Value::BoolArray(b)) => a == b,
        (Value::StringArray(a), Value::StringArray(b)) => a == b,
        (Value::UuidArray(a), Value::UuidArray(b)) => a == b,
        _ => match (a.array_len(), b.array_len()) {
            (Some(len), Some(other)) if len == other => (0..len).all(|i| {
                match (numeric_item(a, i), numeric_item(b, i)) {
                    (Some(x), Some(y)) => values_equal(&x, &y),
                    _ => false,
                }
            }),
            _ => false,
        },
    }
}

fn numeric_item(array: &Value, index: usize) -> Option<Value> {
    match array {
        Value::Int32Array(items) => items.get(index).copied().map(Value::Int32),
        Value::Int64Array(items) => items.get(index).copied().map(Value::Int64),
        Value::Float32Array(items) => items.get(index).copied().map(Value::Float32),
        Value::Float64Array(items) => items.get(index).copied().map(Value::Float64),
        _ => None,
    }
}

fn string_pair<'a>(source: &'a Value, value: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((source.as_str()?, value.as_str()?))
}

/// Membership test. `None` when `source` is not a sequence.
fn sequence_contains(source: &Value, value: &Value) -> Option<bool> {
    let found = match source {
        Value::BoolArray(items) => items.iter().any(|x| values_equal(&Value::Bool(*x), value)),
        Value::Int32Array(items) => items.iter().any(|x| values_equal(&Value::Int32(*x), value)),
        Value::Int64Array(items) => items.iter().any(|x| values_equal(&Value::Int64(*x), value)),
        Value::Float32Array(items) => {
            items.iter().any(|x| values_equal(&Value::Float32(*x), value))
        }
        Value::Float64Array(items) => {
            items.iter().any(|x| values_equal(&Value::Float64(*x), value))
        }
        Value::StringArray(items) => value.as_str().is_some_and(|v| items.iter().any(|x| x == v)),
        Value::UuidArray(items) => value.as_uuid().is_some_and(|v| items.contains(v)),
        Value::Bytes(bytes) => value
            .as_i64()
            .and_then(|b| u8::try_from(b).ok())
            .is_some_and(|b| bytes.contains(&b)),
        _ => return None,
    };
    Some(found)
}

/// Null-or-empty test. `None` when `source` has no notion of emptiness.
fn emptiness(source: &Value, whitespace: bool) -> Option<bool> {
    match source {
        Value::Null => Some(true),
        Value::String(s) if whitespace => Some(s.trim().is_empty()),
        Value::String(s) => Some(s.is_empty()),
        Value::Bytes(b) => Some(b.is_empty()),
        other => other.array_len().map(|len| len == 0),
    }
}
