//! Record-type catalog.
//!
//! The catalog describes the shape of the records a filter is compiled
//! against: entity names, field names and field types.

mod entity;
mod field;
mod types;

pub use entity::EntityDef;
pub use field::FieldDef;
pub use types::{FieldType, ScalarType};
