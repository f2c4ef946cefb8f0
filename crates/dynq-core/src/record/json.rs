//! JSON adapters for records, values and criteria.
//!
//! Filter requests usually arrive as untyped JSON. These helpers turn JSON
//! into typed [`Value`]s using the field types of an [`EntityDef`], so the
//! compiler sees operands of the right type.

use dynq_proto::{Criterion, Error as ProtoError, Operator, Value};
use serde::Deserialize;
use serde_json::{Map, Number, Value as JsonValue};

use super::row::Row;
use crate::catalog::{EntityDef, FieldType, ScalarType};
use crate::config::FieldMatching;
use crate::error::Error;

/// Convert a JSON value to a [`Value`] of the given field type.
///
/// `null` converts to `Null` for every type; nullability is checked by the
/// compiler, not here.
pub fn json_to_value(json: &JsonValue, field_type: &FieldType) -> Result<Value, Error> {
    match (field_type, json) {
        (_, JsonValue::Null) => Ok(Value::Null),
        (FieldType::ArrayScalar(scalar), JsonValue::Array(items)) => array_value(*scalar, items),
        (FieldType::ArrayScalar(_), other) => Err(mismatch(field_type, other)),
        (FieldType::Scalar(scalar) | FieldType::OptionalScalar(scalar), other) => {
            scalar_value(*scalar, other)
        }
    }
}

/// Convert JSON to a [`Value`] without a declared type.
pub fn infer_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => infer_array(items).unwrap_or_else(|| Value::String(json.to_string())),
        JsonValue::Object(_) => Value::String(json.to_string()),
    }
}

fn infer_array(items: &[JsonValue]) -> Option<Value> {
    if items.iter().all(JsonValue::is_string) {
        return array_value(ScalarType::String, items).ok();
    }
    if items.iter().all(JsonValue::is_boolean) {
        return array_value(ScalarType::Bool, items).ok();
    }
    if items.iter().all(JsonValue::is_i64) {
        return array_value(ScalarType::Int64, items).ok();
    }
    if items.iter().all(JsonValue::is_number) {
        return array_value(ScalarType::Float64, items).ok();
    }
    None
}

/// Convert a [`Value`] to JSON.
///
/// Bytes are hex encoded and UUIDs use their hyphenated form.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int32(i) => JsonValue::from(*i),
        Value::Int64(i) | Value::Timestamp(i) => JsonValue::from(*i),
        Value::Float32(f) => float_json(*f as f64),
        Value::Float64(f) => float_json(*f),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Bytes(b) => JsonValue::String(hex::encode(b)),
        Value::Uuid(_) => JsonValue::String(value.to_string()),
        Value::BoolArray(v) => v.iter().map(|b| JsonValue::Bool(*b)).collect(),
        Value::Int32Array(v) => v.iter().map(|i| JsonValue::from(*i)).collect(),
        Value::Int64Array(v) => v.iter().map(|i| JsonValue::from(*i)).collect(),
        Value::Float32Array(v) => v.iter().map(|f| float_json(*f as f64)).collect(),
        Value::Float64Array(v) => v.iter().map(|f| float_json(*f)).collect(),
        Value::StringArray(v) => v.iter().map(|s| JsonValue::String(s.clone())).collect(),
        Value::UuidArray(v) => v
            .iter()
            .map(|u| JsonValue::String(Value::Uuid(*u).to_string()))
            .collect(),
    }
}

fn float_json(f: f64) -> JsonValue {
    Number::from_f64(f).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

fn mismatch(field_type: &impl std::fmt::Display, json: &JsonValue) -> Error {
    Error::InvalidData(format!("expected {}, got {}", field_type, json))
}

fn scalar_value(scalar: ScalarType, json: &JsonValue) -> Result<Value, Error> {
    let value = match scalar {
        ScalarType::Bool => json.as_bool().map(Value::Bool),
        ScalarType::Int32 => json
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::Int32),
        ScalarType::Int64 => json.as_i64().map(Value::Int64),
        ScalarType::Float32 => json.as_f64().map(|f| Value::Float32(f as f32)),
        ScalarType::Float64 => json.as_f64().map(Value::Float64),
        ScalarType::String => json.as_str().map(|s| Value::String(s.to_string())),
        ScalarType::Bytes => json
            .as_str()
            .and_then(|s| hex::decode(s.trim_start_matches("0x")).ok())
            .map(Value::Bytes),
        ScalarType::Timestamp => json.as_i64().map(Value::Timestamp),
        ScalarType::Uuid => json.as_str().and_then(parse_uuid).map(Value::Uuid),
    };
    value.ok_or_else(|| mismatch(&scalar, json))
}

fn array_value(scalar: ScalarType, items: &[JsonValue]) -> Result<Value, Error> {
    let values = items
        .iter()
        .map(|item| scalar_value(scalar, item))
        .collect::<Result<Vec<_>, _>>()?;

    let array = match scalar {
        ScalarType::Bool => Value::BoolArray(values.iter().filter_map(Value::as_bool).collect()),
        ScalarType::Int32 => Value::Int32Array(values.iter().filter_map(Value::as_i32).collect()),
        ScalarType::Int64 => Value::Int64Array(values.iter().filter_map(Value::as_i64).collect()),
        ScalarType::Float32 => Value::Float32Array(
            values
                .iter()
                .filter_map(|v| match v {
                    Value::Float32(f) => Some(*f),
                    _ => None,
                })
                .collect(),
        ),
        ScalarType::Float64 => {
            Value::Float64Array(values.iter().filter_map(Value::as_f64).collect())
        }
        ScalarType::String => Value::StringArray(
            values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        ScalarType::Uuid => {
            Value::UuidArray(values.iter().filter_map(|v| v.as_uuid().copied()).collect())
        }
        ScalarType::Bytes | ScalarType::Timestamp => {
            return Err(Error::InvalidData(format!("arrays of {} are not supported", scalar)))
        }
    };
    Ok(array)
}

fn parse_uuid(s: &str) -> Option<[u8; 16]> {
    let digits: String = s.chars().filter(|c| *c != '-').collect();
    hex::decode(digits).ok()?.try_into().ok()
}

impl Row {
    /// Build a row from a JSON object, converting each member by field type.
    ///
    /// Members the entity does not define are ignored; missing fields are `Null`.
    pub fn from_json(entity: &EntityDef, json: &JsonValue) -> Result<Self, Error> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::InvalidData(format!("expected object, got {}", json)))?;

        let values = entity
            .fields
            .iter()
            .map(|field| match object.get(&field.name) {
                Some(member) => json_to_value(member, &field.field_type).map_err(|e| {
                    Error::InvalidData(format!("{}.{}: {}", entity.name, field.name, e))
                }),
                None => Ok(Value::Null),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Row::new(values))
    }

    /// Render the row as a JSON object keyed by field name.
    pub fn to_json(&self, entity: &EntityDef) -> JsonValue {
        let object: Map<String, JsonValue> = entity
            .fields
            .iter()
            .enumerate()
            .map(|(slot, field)| (field.name.clone(), value_to_json(self.get(slot))))
            .collect();
        JsonValue::Object(object)
    }
}

/// Wire shape of a criterion with an untyped value.
///
/// The `propertyName` / `comparisonFilter` / `propertyValue` aliases accept
/// payloads written for the older filter format.
#[derive(Debug, Deserialize)]
struct RawCriterion {
    #[serde(alias = "propertyName", alias = "PropertyName")]
    field: String,
    #[serde(alias = "comparisonFilter", alias = "ComparisonFilter")]
    operator: String,
    #[serde(default, alias = "propertyValue", alias = "PropertyValue")]
    value: JsonValue,
}

/// Parse criteria from JSON: `[{"field": .., "operator": .., "value": ..}]`.
///
/// Values are converted using the declared type of the field they compare
/// against. Membership and pattern operators on array fields take an element
/// value. A field that does not resolve keeps an inferred value so that
/// compiling the criteria reports it.
pub fn criteria_from_json(
    entity: &EntityDef,
    json: &JsonValue,
    matching: FieldMatching,
) -> Result<Vec<Criterion>, Error> {
    let raw: Vec<RawCriterion> = match json {
        JsonValue::Array(_) => Vec::<RawCriterion>::deserialize(json)?,
        JsonValue::Object(_) => vec![RawCriterion::deserialize(json)?],
        other => {
            return Err(ProtoError::InvalidMessage(format!(
                "expected criteria array, got {}",
                other
            ))
            .into())
        }
    };

    raw.into_iter()
        .map(|raw| {
            let operator: Operator = raw.operator.parse()?;
            let value = if !operator.uses_value() {
                Value::Null
            } else {
                match matching.resolve(entity, &raw.field) {
                    Some(field) => {
                        let operand_type = operand_type(&field.field_type, operator);
                        json_to_value(&raw.value, &operand_type).map_err(|e| {
                            Error::InvalidData(format!("{} {}: {}", raw.field, operator, e))
                        })?
                    }
                    None => infer_value(&raw.value),
                }
            };
            Ok(Criterion::new(raw.field, operator, value))
        })
        .collect()
}

/// Type of the comparison operand for `operator` on a field of `field_type`.
///
/// Equality compares whole arrays; every other operator on an array field
/// takes a single element.
pub fn operand_type(field_type: &FieldType, operator: Operator) -> FieldType {
    match field_type {
        FieldType::ArrayScalar(scalar) if !operator.is_equality() => FieldType::Scalar(*scalar),
        other => *other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldDef;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn user() -> EntityDef {
        EntityDef::new("User")
            .with_field(FieldDef::scalar("name", ScalarType::String))
            .with_field(FieldDef::scalar("age", ScalarType::Int32))
            .with_field(FieldDef::array("tags", ScalarType::String))
            .with_field(FieldDef::optional_scalar("id", ScalarType::Uuid))
    }

    #[test]
    fn test_json_to_value_scalars() {
        let int = FieldType::Scalar(ScalarType::Int32);
        assert_eq!(json_to_value(&json!(30), &int).unwrap(), Value::Int32(30));
        assert!(json_to_value(&json!(1_u64 << 40), &int).is_err());
        assert!(json_to_value(&json!("30"), &int).is_err());
        assert_eq!(json_to_value(&json!(null), &int).unwrap(), Value::Null);

        let float = FieldType::Scalar(ScalarType::Float64);
        assert_eq!(json_to_value(&json!(2), &float).unwrap(), Value::Float64(2.0));

        let bytes = FieldType::Scalar(ScalarType::Bytes);
        assert_eq!(json_to_value(&json!("0x0aff"), &bytes).unwrap(), Value::Bytes(vec![0x0a, 0xff]));

        let uuid = FieldType::Scalar(ScalarType::Uuid);
        assert_eq!(
            json_to_value(&json!("11111111-1111-1111-1111-111111111111"), &uuid).unwrap(),
            Value::Uuid([0x11; 16])
        );
        assert!(json_to_value(&json!("1111"), &uuid).is_err());
    }

    #[test]
    fn test_json_to_value_arrays() {
        let tags = FieldType::ArrayScalar(ScalarType::String);
        assert_eq!(
            json_to_value(&json!(["a", "b"]), &tags).unwrap(),
            Value::StringArray(vec!["a".into(), "b".into()])
        );
        assert_eq!(json_to_value(&json!([]), &tags).unwrap(), Value::StringArray(vec![]));
        assert!(json_to_value(&json!("a"), &tags).is_err());
        assert!(json_to_value(&json!(["a", 1]), &tags).is_err());

        let scores = FieldType::ArrayScalar(ScalarType::Int64);
        assert_eq!(json_to_value(&json!([1, 2]), &scores).unwrap(), Value::Int64Array(vec![1, 2]));
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value(&json!(3)), Value::Int64(3));
        assert_eq!(infer_value(&json!(3.5)), Value::Float64(3.5));
        assert_eq!(infer_value(&json!("x")), Value::String("x".into()));
        assert_eq!(infer_value(&json!([1, 2.5])), Value::Float64Array(vec![1.0, 2.5]));
        assert_eq!(infer_value(&json!([true])), Value::BoolArray(vec![true]));
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(value_to_json(&Value::Int32(3)), json!(3));
        assert_eq!(value_to_json(&Value::Bytes(vec![0xab])), json!("ab"));
        assert_eq!(value_to_json(&Value::Float64(f64::NAN)), json!(null));
        assert_eq!(value_to_json(&Value::Int32Array(vec![1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_bytes_json_matches_display() {
        let bytes = Value::Bytes(vec![0x00, 0x0a, 0xff]);
        assert_eq!(bytes.to_string(), "0x000aff");
        assert_eq!(value_to_json(&bytes), json!("000aff"));
        let bytes_type = FieldType::Scalar(ScalarType::Bytes);
        assert_eq!(json_to_value(&json!(bytes.to_string()), &bytes_type).unwrap(), bytes);

        let id = Value::Uuid([0xab; 16]);
        assert_eq!(value_to_json(&id), json!("abababab-abab-abab-abab-abababababab"));
    }

    #[test]
    fn test_row_json() {
        let entity = user();
        let row = Row::from_json(
            &entity,
            &json!({"name": "Alice", "age": 30, "tags": ["admin"], "extra": true}),
        )
        .unwrap();

        assert_eq!(
            row.values(),
            &[
                Value::from("Alice"),
                Value::Int32(30),
                Value::StringArray(vec!["admin".into()]),
                Value::Null,
            ]
        );
        assert_eq!(
            row.to_json(&entity),
            json!({"name": "Alice", "age": 30, "tags": ["admin"], "id": null})
        );

        assert!(Row::from_json(&entity, &json!({"age": "old"})).is_err());
        assert!(Row::from_json(&entity, &json!([1])).is_err());
    }

    #[test]
    fn test_criteria_from_json() {
        let criteria = criteria_from_json(
            &user(),
            &json!([
                {"field": "name", "operator": "StartsWith", "value": "Ali"},
                {"field": "Age", "operator": ">=", "value": 30},
                {"field": "tags", "operator": "contains", "value": "admin"},
                {"field": "id", "operator": "IsNullOrEmpty"}
            ]),
            FieldMatching::IgnoreCase,
        )
        .unwrap();

        assert_eq!(
            criteria,
            vec![
                Criterion::starts_with("name", "Ali"),
                Criterion::ge("Age", 30),
                Criterion::contains("tags", "admin"),
                Criterion::is_null_or_empty("id"),
            ]
        );
    }

    #[test]
    fn test_criteria_from_json_legacy_names() {
        let criteria = criteria_from_json(
            &user(),
            &json!({"PropertyName": "age", "ComparisonFilter": "LessThan", "PropertyValue": 18}),
            FieldMatching::Exact,
        )
        .unwrap();
        assert_eq!(criteria, vec![Criterion::lt("age", 18)]);
    }

    #[test]
    fn test_criteria_from_json_errors() {
        let entity = user();

        let err = criteria_from_json(&entity, &json!([{"field": "age", "operator": "between"}]), FieldMatching::Exact)
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtoError::UnknownOperator(_))));

        let err = criteria_from_json(&entity, &json!([{"field": "age", "operator": "=", "value": "x"}]), FieldMatching::Exact)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        let err = criteria_from_json(&entity, &json!("age = 3"), FieldMatching::Exact).unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtoError::InvalidMessage(_))));

        // unknown fields keep an inferred value
        let criteria = criteria_from_json(&entity, &json!([{"field": "nickname", "operator": "=", "value": 3}]), FieldMatching::Exact)
            .unwrap();
        assert_eq!(criteria, vec![Criterion::eq("nickname", Value::Int64(3))]);
    }
}
