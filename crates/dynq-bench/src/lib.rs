//! dynq Benchmark Suite
//!
//! Criterion benchmarks for the predicate compiler.
//!
//! # Benchmark Categories
//!
//! - **Filter**: Compile cost, per-operator evaluation, dynamic rows vs struct readers
//! - **Cache**: Predicate cache hits vs recompiling

pub mod fixtures;

pub use fixtures::{generate_users, user_entity, user_schema, user_to_row, Scale, UserData};
