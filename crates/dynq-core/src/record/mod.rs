//! Field access for the records a predicate is evaluated against.
//!
//! A [`RecordType`] is both the record-type descriptor (its [`EntityDef`]) and
//! the field-accessor provider: for each field it hands out a reader closure
//! that the compiler binds once, so evaluation never looks names up.
//!
//! Two providers ship with the crate:
//! - [`EntityDef`] reads positional dynamic [`Row`]s.
//! - [`RecordSchema`] reads fields off a Rust type through registered closures.

mod json;
mod row;
mod schema;

use std::borrow::Cow;
use std::sync::Arc;

use dynq_proto::Value;

use crate::catalog::{EntityDef, FieldDef};

pub use json::{criteria_from_json, infer_value, json_to_value, operand_type, value_to_json};
pub use row::Row;
pub use schema::RecordSchema;

/// Reads one field's value off a record.
pub type FieldReader<R> = Arc<dyn for<'r> Fn(&'r R) -> Cow<'r, Value> + Send + Sync>;

/// Wrap a closure as a [`FieldReader`].
pub fn reader<R, F>(read: F) -> FieldReader<R>
where
    R: ?Sized,
    F: for<'r> Fn(&'r R) -> Cow<'r, Value> + Send + Sync + 'static,
{
    Arc::new(read)
}

/// A record-type descriptor that can produce field readers.
pub trait RecordType {
    /// The record the readers accept.
    type Record: ?Sized;

    /// Shape of the records: entity name and typed fields.
    fn entity(&self) -> &EntityDef;

    /// Reader for a field of [`entity`](Self::entity), or `None` if the field
    /// cannot be read.
    fn reader(&self, field: &FieldDef) -> Option<FieldReader<Self::Record>>;
}

impl RecordType for EntityDef {
    type Record = Row;

    fn entity(&self) -> &EntityDef {
        self
    }

    fn reader(&self, field: &FieldDef) -> Option<FieldReader<Row>> {
        let slot = self.field_index(&field.name)?;
        Some(reader(move |row: &Row| Cow::Borrowed(row.get(slot))))
    }
}

impl<T: RecordType + ?Sized> RecordType for &T {
    type Record = T::Record;

    fn entity(&self) -> &EntityDef {
        (**self).entity()
    }

    fn reader(&self, field: &FieldDef) -> Option<FieldReader<Self::Record>> {
        (**self).reader(field)
    }
}

impl<T: RecordType + ?Sized> RecordType for Arc<T> {
    type Record = T::Record;

    fn entity(&self) -> &EntityDef {
        (**self).entity()
    }

    fn reader(&self, field: &FieldDef) -> Option<FieldReader<Self::Record>> {
        (**self).reader(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScalarType;

    #[test]
    fn test_entity_reader_borrows_slot() {
        let entity = EntityDef::new("User")
            .with_field(FieldDef::scalar("name", ScalarType::String))
            .with_field(FieldDef::scalar("age", ScalarType::Int32));
        let row = Row::new(vec![Value::from("Alice"), Value::Int32(30)]);

        let age = entity.reader(&entity.fields[1]).unwrap();
        assert!(matches!(age(&row), Cow::Borrowed(Value::Int32(30))));

        let foreign = FieldDef::scalar("email", ScalarType::String);
        assert!(entity.reader(&foreign).is_none());
    }

    #[test]
    fn test_short_row_reads_null() {
        let entity = EntityDef::new("User")
            .with_field(FieldDef::scalar("name", ScalarType::String))
            .with_field(FieldDef::optional_scalar("email", ScalarType::String));
        let row = Row::new(vec![Value::from("Alice")]);

        let email = entity.reader(&entity.fields[1]).unwrap();
        assert_eq!(*email(&row), Value::Null);
    }
}
