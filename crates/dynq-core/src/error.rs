//! Core error types.

use dynq_proto::Operator;
use thiserror::Error;

/// Errors that reject a filter at compile time.
///
/// No partial predicate is produced when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// The criterion names a field the record type does not have or cannot read.
    #[error("field not found: {entity}.{field}")]
    FieldNotFound {
        /// Entity the field was looked up on.
        entity: String,
        /// Field name as given by the criterion.
        field: String,
    },

    /// An ordering operator applied to a field whose type has no order.
    #[error("operator {operator} is not supported for field {field} of type {field_type}")]
    UnsupportedOperatorForType {
        /// Field name.
        field: String,
        /// Offending operator.
        operator: Operator,
        /// Declared field type.
        field_type: String,
    },

    /// The comparison value cannot be compared with the field type.
    #[error("incompatible value for {field} {operator}: expected {expected}, got {actual}")]
    IncompatibleValue {
        /// Field name.
        field: String,
        /// Operator of the criterion.
        operator: Operator,
        /// Declared field type.
        expected: String,
        /// Type of the supplied value.
        actual: String,
    },

    /// The filter has more criteria than the configured limit.
    #[error("too many criteria: {count} exceeds limit of {limit}")]
    TooManyCriteria {
        /// Number of criteria supplied.
        count: usize,
        /// Configured maximum.
        limit: usize,
    },
}

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Filter compilation error.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] dynq_proto::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record or criterion referenced a field the entity does not define.
    #[error("unknown field: {entity}.{field}")]
    UnknownField {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
    },

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
