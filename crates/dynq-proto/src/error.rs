//! Protocol error types.

use thiserror::Error;

/// Errors raised while interpreting filter descriptions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Operator name or symbol not recognised.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// Field type string could not be parsed.
    #[error("invalid field type: {0}")]
    InvalidFieldType(String),

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
