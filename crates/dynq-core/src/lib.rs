//! dynq core - runtime predicate compiler and operator semantics.
//!
//! Filters arrive at runtime as lists of [`Criterion`]s naming a field, an
//! operator, and a value. This crate resolves them against a record type once
//! and produces a [`CompiledPredicate`] that tests records without further
//! lookups.
//!
//! ```ignore
//! use dynq_core::{compile, EntityDef, FieldDef, Row, ScalarType};
//! use dynq_core::proto::Criterion;
//!
//! let user = EntityDef::new("User")
//!     .with_field(FieldDef::scalar("name", ScalarType::String))
//!     .with_field(FieldDef::scalar("age", ScalarType::Int32));
//!
//! let predicate = compile(&user, &[
//!     Criterion::starts_with("name", "Ali"),
//!     Criterion::ge("age", 30),
//! ])?;
//!
//! let matches: Vec<&Row> = predicate.filter(&rows).collect();
//! ```

pub mod cache;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod error;
pub mod operator;
pub mod query;
pub mod record;

pub use cache::{CacheStats, PredicateCache, PredicateFingerprint};
pub use catalog::{EntityDef, FieldDef, FieldType, ScalarType};
pub use compiler::{compile, CompiledPredicate, PredicateCompiler};
pub use config::{CompilerConfig, FieldMatching};
pub use error::{CompileError, Error};
pub use query::{filter_records, DynamicWhere, Where};
pub use record::{
    criteria_from_json, infer_value, json_to_value, operand_type, reader, value_to_json, FieldReader,
    RecordSchema, RecordType, Row,
};

pub use dynq_proto::{Criterion, Operator, Value};

/// Re-export protocol types.
pub use dynq_proto as proto;
