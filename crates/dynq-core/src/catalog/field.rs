//! Field definitions for entities.

use super::types::{FieldType, ScalarType};
use serde::{Deserialize, Serialize};

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDef {
    /// Create a new field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Create a required scalar field.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar))
    }

    /// Create an optional scalar field.
    pub fn optional_scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::OptionalScalar(scalar))
    }

    /// Create an array field.
    pub fn array(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::ArrayScalar(scalar))
    }
}
