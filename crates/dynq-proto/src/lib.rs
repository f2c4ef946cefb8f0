//! dynq protocol types.
//!
//! This crate defines the data model shared by every dynq caller: runtime
//! values, the closed operator catalogue, and filter criteria. All types derive
//! `serde` traits for JSON transport and `rkyv` traits for zero-copy
//! serialization.
//!
//! # Modules
//!
//! - [`value`] - Runtime value types for field values and comparison operands
//! - [`criterion`] - Operators and filter criteria
//! - [`error`] - Protocol error types
//!
//! # Serialization
//!
//! ```ignore
//! use dynq_proto::{Criterion, Operator};
//!
//! let criterion = Criterion::new("name", Operator::StartsWith, "Ali");
//! let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&criterion).unwrap();
//! let archived = rkyv::access::<ArchivedCriterion, rkyv::rancor::Error>(&bytes).unwrap();
//! let deserialized: Criterion = rkyv::deserialize::<Criterion, rkyv::rancor::Error>(archived).unwrap();
//! ```

pub mod criterion;
pub mod error;
pub mod value;

pub use criterion::{Criterion, Operator};
pub use error::Error;
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_roundtrip() {
        let criteria = vec![
            Criterion::starts_with("name", "Ali"),
            Criterion::ge("age", 30),
            Criterion::is_null_or_empty("tags"),
        ];

        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&criteria).unwrap();
        let archived = rkyv::access::<rkyv::Archived<Vec<Criterion>>, rkyv::rancor::Error>(&bytes)
            .unwrap();
        let deserialized: Vec<Criterion> =
            rkyv::deserialize::<Vec<Criterion>, rkyv::rancor::Error>(archived).unwrap();
        assert_eq!(criteria, deserialized);
    }

    #[test]
    fn test_criteria_json_roundtrip() {
        let criteria = vec![
            Criterion::contains("tags", "rust"),
            Criterion::lt("score", 9.5f64),
        ];
        let json = serde_json::to_string(&criteria).unwrap();
        let parsed: Vec<Criterion> = serde_json::from_str(&json).unwrap();
        assert_eq!(criteria, parsed);
    }
}
