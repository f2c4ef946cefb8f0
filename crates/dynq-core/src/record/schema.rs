//! Record schemas for Rust types.

use std::borrow::Cow;
use std::fmt;

use dynq_proto::Value;

use super::{reader, FieldReader, RecordType};
use crate::catalog::{EntityDef, FieldDef, FieldType};

/// Describes how to read the fields of a Rust type `R`.
///
/// ```ignore
/// let schema = RecordSchema::new("User")
///     .field("name", FieldType::Scalar(ScalarType::String), |u: &User| u.name.clone())
///     .field("age", FieldType::Scalar(ScalarType::Int32), |u: &User| u.age);
/// ```
pub struct RecordSchema<R: ?Sized> {
    entity: EntityDef,
    readers: Vec<FieldReader<R>>,
}

impl<R: ?Sized> RecordSchema<R> {
    /// Create an empty schema for an entity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entity: EntityDef::new(name),
            readers: Vec::new(),
        }
    }

    /// Register a field read by `read`.
    pub fn field<F, T>(self, name: impl Into<String>, field_type: FieldType, read: F) -> Self
    where
        F: Fn(&R) -> T + Send + Sync + 'static,
        T: Into<Value>,
    {
        self.field_with(
            FieldDef::new(name, field_type),
            reader(move |record: &R| Cow::Owned(read(record).into())),
        )
    }

    /// Register a field with a prebuilt reader.
    pub fn field_with(mut self, field: FieldDef, read: FieldReader<R>) -> Self {
        self.entity.fields.push(field);
        self.readers.push(read);
        self
    }

    /// The entity definition built so far.
    pub fn entity_def(&self) -> &EntityDef {
        &self.entity
    }
}

impl<R: ?Sized> RecordType for RecordSchema<R> {
    type Record = R;

    fn entity(&self) -> &EntityDef {
        &self.entity
    }

    fn reader(&self, field: &FieldDef) -> Option<FieldReader<R>> {
        let slot = self.entity.field_index(&field.name)?;
        self.readers.get(slot).cloned()
    }
}

impl<R: ?Sized> Clone for RecordSchema<R> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity.clone(),
            readers: self.readers.clone(),
        }
    }
}

impl<R: ?Sized> fmt::Debug for RecordSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScalarType;

    struct User {
        name: String,
        age: i32,
        tags: Vec<String>,
    }

    fn schema() -> RecordSchema<User> {
        RecordSchema::new("User")
            .field("name", FieldType::Scalar(ScalarType::String), |u: &User| u.name.clone())
            .field("age", FieldType::Scalar(ScalarType::Int32), |u: &User| u.age)
            .field("tags", FieldType::ArrayScalar(ScalarType::String), |u: &User| u.tags.clone())
    }

    #[test]
    fn test_schema_readers() {
        let schema = schema();
        let user = User {
            name: "Alice".into(),
            age: 30,
            tags: vec!["admin".into()],
        };

        assert_eq!(schema.entity().fields.len(), 3);
        let age = schema.reader(&schema.entity().fields[1]).unwrap();
        assert_eq!(age(&user).into_owned(), Value::Int32(30));

        let tags = schema.reader(&schema.entity().fields[2]).unwrap();
        assert_eq!(tags(&user).into_owned(), Value::StringArray(vec!["admin".into()]));
    }

    #[test]
    fn test_schema_unknown_field() {
        let schema = schema();
        let other = FieldDef::scalar("email", ScalarType::String);
        assert!(schema.reader(&other).is_none());
        assert_eq!(schema.clone().entity_def().name, "User");
    }
}
