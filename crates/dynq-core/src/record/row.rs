//! Positional dynamic records.

use dynq_proto::Value;

use crate::catalog::EntityDef;
use crate::error::Error;

static NULL: Value = Value::Null;

/// A dynamic record whose values are stored in the slot order of an
/// [`EntityDef`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a row from values in slot order.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Build a row from named values.
    ///
    /// Fields the entity defines but `fields` omits are `Null`. A name the
    /// entity does not define is an error.
    pub fn from_fields(entity: &EntityDef, fields: Vec<(String, Value)>) -> Result<Self, Error> {
        let mut values = vec![Value::Null; entity.fields.len()];
        for (name, value) in fields {
            let slot = entity.field_index(&name).ok_or_else(|| Error::UnknownField {
                entity: entity.name.clone(),
                field: name.clone(),
            })?;
            values[slot] = value;
        }
        Ok(Self { values })
    }

    /// Value at `slot`, or `Null` past the end of the row.
    pub fn get(&self, slot: usize) -> &Value {
        self.values.get(slot).unwrap_or(&NULL)
    }

    /// Value of a named field of `entity`.
    pub fn get_by_name(&self, entity: &EntityDef, name: &str) -> Option<&Value> {
        entity.field_index(name).map(|slot| self.get(slot))
    }

    /// Values in slot order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Pair each value with its field name.
    pub fn to_fields(&self, entity: &EntityDef) -> Vec<(String, Value)> {
        entity
            .fields
            .iter()
            .enumerate()
            .map(|(slot, field)| (field.name.clone(), self.get(slot).clone()))
            .collect()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the row, returning its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}
