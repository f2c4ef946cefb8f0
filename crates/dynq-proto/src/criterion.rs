//! Filter criterion types.
//!
//! A [`Criterion`] names a field, a comparison [`Operator`], and a comparison
//! value. A filter is an ordered list of criteria combined with logical AND.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::value::Value;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Comparison operators available to a criterion.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Archive,
    Serialize,
    Deserialize,
    SerdeSerialize,
    SerdeDeserialize,
)]
pub enum Operator {
    /// Field equals value.
    Equal,
    /// Field does not equal value.
    NotEqual,
    /// Field is less than value.
    LessThan,
    /// Field is greater than value.
    GreaterThan,
    /// Field is less than or equal to value.
    LessThanEqual,
    /// Field is greater than or equal to value.
    GreaterThanEqual,
    /// Substring or element membership.
    Contains,
    /// Negated substring or element membership.
    DoesNotContain,
    /// String prefix.
    StartsWith,
    /// Negated string prefix.
    DoesNotStartWith,
    /// String suffix.
    EndsWith,
    /// Negated string suffix.
    DoesNotEndWith,
    /// Prefix, substring or suffix.
    Like,
    /// Neither prefix, substring nor suffix.
    NotLike,
    /// Null, empty string or empty collection.
    IsNullOrEmpty,
    /// Negation of `IsNullOrEmpty`.
    IsNotNullOrEmpty,
    /// Null, whitespace-only string or empty collection.
    IsNullOrWhiteSpace,
    /// Negation of `IsNullOrWhiteSpace`.
    IsNotNullOrWhiteSpace,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 18] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessThanEqual,
        Operator::GreaterThanEqual,
        Operator::Contains,
        Operator::DoesNotContain,
        Operator::StartsWith,
        Operator::DoesNotStartWith,
        Operator::EndsWith,
        Operator::DoesNotEndWith,
        Operator::Like,
        Operator::NotLike,
        Operator::IsNullOrEmpty,
        Operator::IsNotNullOrEmpty,
        Operator::IsNullOrWhiteSpace,
        Operator::IsNotNullOrWhiteSpace,
    ];

    /// Canonical name of the operator.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Equal => "Equal",
            Operator::NotEqual => "NotEqual",
            Operator::LessThan => "LessThan",
            Operator::GreaterThan => "GreaterThan",
            Operator::LessThanEqual => "LessThanEqual",
            Operator::GreaterThanEqual => "GreaterThanEqual",
            Operator::Contains => "Contains",
            Operator::DoesNotContain => "DoesNotContain",
            Operator::StartsWith => "StartsWith",
            Operator::DoesNotStartWith => "DoesNotStartWith",
            Operator::EndsWith => "EndsWith",
            Operator::DoesNotEndWith => "DoesNotEndWith",
            Operator::Like => "Like",
            Operator::NotLike => "NotLike",
            Operator::IsNullOrEmpty => "IsNullOrEmpty",
            Operator::IsNotNullOrEmpty => "IsNotNullOrEmpty",
            Operator::IsNullOrWhiteSpace => "IsNullOrWhiteSpace",
            Operator::IsNotNullOrWhiteSpace => "IsNotNullOrWhiteSpace",
        }
    }

    /// Check if this is `Equal` or `NotEqual`.
    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Equal | Operator::NotEqual)
    }

    /// Check if this operator requires an ordered field type.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::LessThan
                | Operator::GreaterThan
                | Operator::LessThanEqual
                | Operator::GreaterThanEqual
        )
    }

    /// Check if this is one of the null/empty/whitespace checks.
    pub fn is_emptiness_check(&self) -> bool {
        matches!(
            self,
            Operator::IsNullOrEmpty
                | Operator::IsNotNullOrEmpty
                | Operator::IsNullOrWhiteSpace
                | Operator::IsNotNullOrWhiteSpace
        )
    }

    /// Whether the comparison value takes part in the test.
    pub fn uses_value(&self) -> bool {
        !self.is_emptiness_check()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = Error;

    /// Parse an operator name or symbol.
    ///
    /// Names are matched ignoring case, `_`, `-` and spaces, so `StartsWith`,
    /// `starts_with` and `startswith` are equivalent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = match s.trim() {
            "=" | "==" => Some(Operator::Equal),
            "!=" | "<>" => Some(Operator::NotEqual),
            "<" => Some(Operator::LessThan),
            ">" => Some(Operator::GreaterThan),
            "<=" => Some(Operator::LessThanEqual),
            ">=" => Some(Operator::GreaterThanEqual),
            _ => None,
        };
        if let Some(op) = symbol {
            return Ok(op);
        }

        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.name().to_lowercase() == normalized)
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

/// A single filter term: `field operator value`.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct Criterion {
    /// Name of the field on the record type.
    pub field: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Right-hand operand. Ignored by the emptiness checks.
    #[serde(default)]
    pub value: Value,
}

impl Criterion {
    /// Create a new criterion.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Create an operator-only criterion (the value is `Null`).
    pub fn unary(field: impl Into<String>, operator: Operator) -> Self {
        Self::new(field, operator, Value::Null)
    }

    /// Create an equality criterion.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Equal, value)
    }

    /// Create a not-equal criterion.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::NotEqual, value)
    }

    /// Create a less-than criterion.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThan, value)
    }

    /// Create a less-than-or-equal criterion.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThanEqual, value)
    }

    /// Create a greater-than criterion.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThan, value)
    }

    /// Create a greater-than-or-equal criterion.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThanEqual, value)
    }

    /// Create a contains criterion.
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Contains, value)
    }

    /// Create a starts-with criterion.
    pub fn starts_with(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::StartsWith, value)
    }

    /// Create an ends-with criterion.
    pub fn ends_with(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::EndsWith, value)
    }

    /// Create a like criterion.
    pub fn like(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Like, value)
    }

    /// Create an is-null-or-empty criterion.
    pub fn is_null_or_empty(field: impl Into<String>) -> Self {
        Self::unary(field, Operator::IsNullOrEmpty)
    }

    /// Create an is-null-or-whitespace criterion.
    pub fn is_null_or_white_space(field: impl Into<String>) -> Self {
        Self::unary(field, Operator::IsNullOrWhiteSpace)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.uses_value() {
            write!(f, "{} {} {}", self.field, self.operator, self.value)
        } else {
            write!(f, "{} {}", self.field, self.operator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_names() {
        assert_eq!("StartsWith".parse::<Operator>().unwrap(), Operator::StartsWith);
        assert_eq!("starts_with".parse::<Operator>().unwrap(), Operator::StartsWith);
        assert_eq!("isnullorwhitespace".parse::<Operator>().unwrap(), Operator::IsNullOrWhiteSpace);
        assert_eq!("Does-Not-Contain".parse::<Operator>().unwrap(), Operator::DoesNotContain);
    }

    #[test]
    fn test_operator_parse_symbols() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Equal);
        assert_eq!("<>".parse::<Operator>().unwrap(), Operator::NotEqual);
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::GreaterThanEqual);
        assert_eq!("<".parse::<Operator>().unwrap(), Operator::LessThan);
    }

    #[test]
    fn test_operator_parse_unknown() {
        let err = "between".parse::<Operator>().unwrap_err();
        assert!(matches!(err, Error::UnknownOperator(ref s) if s == "between"));
    }

    #[test]
    fn test_operator_names_roundtrip() {
        for op in Operator::ALL {
            assert_eq!(op.to_string().parse::<Operator>().unwrap(), op);
        }
    }

    #[test]
    fn test_operator_classification() {
        assert!(Operator::LessThan.is_ordering());
        assert!(!Operator::Equal.is_ordering());
        assert!(Operator::NotEqual.is_equality());
        assert!(Operator::IsNotNullOrEmpty.is_emptiness_check());
        assert!(!Operator::IsNullOrWhiteSpace.uses_value());
        assert!(Operator::Like.uses_value());
    }

    #[test]
    fn test_criterion_builders() {
        let c = Criterion::ge("age", 30);
        assert_eq!(c.field, "age");
        assert_eq!(c.operator, Operator::GreaterThanEqual);
        assert_eq!(c.value, Value::Int32(30));

        let c = Criterion::is_null_or_empty("nickname");
        assert_eq!(c.value, Value::Null);
        assert_eq!(c.to_string(), "nickname IsNullOrEmpty");

        assert_eq!(Criterion::starts_with("name", "Ali").to_string(), "name StartsWith Ali");
    }

    #[test]
    fn test_criterion_json_default_value() {
        let c: Criterion =
            serde_json::from_str(r#"{"field":"bio","operator":"IsNullOrWhiteSpace"}"#).unwrap();
        assert_eq!(c, Criterion::is_null_or_white_space("bio"));

        let c: Criterion = serde_json::from_str(
            r#"{"field":"name","operator":"Equal","value":{"String":"Bob"}}"#,
        )
        .unwrap();
        assert_eq!(c, Criterion::eq("name", "Bob"));
    }
}
