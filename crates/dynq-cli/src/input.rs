//! Loading schemas, records and criteria from files and arguments.

use std::fs;
use std::path::{Path, PathBuf};

use dynq_core::{
    criteria_from_json, infer_value, json_to_value, operand_type, EntityDef, FieldMatching, Row,
    ScalarType,
};
use dynq_proto::{Criterion, Operator};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Input loading errors.
#[derive(Debug, Error)]
pub enum InputError {
    /// File could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON or has the wrong shape.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Records or criteria could not be converted.
    #[error(transparent)]
    Core(#[from] dynq_core::Error),

    /// A `--where` term could not be parsed.
    #[error("invalid term '{term}': {reason}")]
    Term { term: String, reason: String },
}

fn read_json(path: &Path) -> Result<JsonValue, InputError> {
    let content = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an entity definition.
pub fn load_schema(path: &Path) -> Result<EntityDef, InputError> {
    let json = read_json(path)?;
    serde_json::from_value(json).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load records from a JSON array of objects.
pub fn load_records(path: &Path, entity: &EntityDef) -> Result<Vec<Row>, InputError> {
    let json = read_json(path)?;
    let items = json.as_array().ok_or_else(|| {
        dynq_core::Error::InvalidData(format!("{}: expected an array of records", path.display()))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Row::from_json(entity, item).map_err(|e| {
                InputError::from(dynq_core::Error::InvalidData(format!(
                    "{} record {}: {}",
                    path.display(),
                    i,
                    e
                )))
            })
        })
        .collect()
}

/// Load criteria from a JSON file.
pub fn load_criteria(
    path: &Path,
    entity: &EntityDef,
    matching: FieldMatching,
) -> Result<Vec<Criterion>, InputError> {
    let json = read_json(path)?;
    Ok(criteria_from_json(entity, &json, matching)?)
}

/// Parse a `field operator [value]` term.
///
/// The value is everything after the operator. It is read as JSON when it
/// parses as JSON, so `"a b"`, `[1, 2]` and `null` work; bare text is a
/// string. String fields take bare text as-is, so `code = 007` keeps the
/// leading zeros.
pub fn parse_term(
    term: &str,
    entity: &EntityDef,
    matching: FieldMatching,
) -> Result<Criterion, InputError> {
    let invalid = |reason: &str| InputError::Term {
        term: term.to_string(),
        reason: reason.to_string(),
    };

    let (field, rest) = split_word(term.trim()).ok_or_else(|| invalid("missing operator"))?;
    let (operator, text) = match split_word(rest) {
        Some((op, text)) => (op, text),
        None => (rest, ""),
    };
    let operator: Operator = operator
        .parse()
        .map_err(|e: dynq_proto::Error| invalid(&e.to_string()))?;

    if !operator.uses_value() {
        if !text.is_empty() {
            return Err(invalid("operator takes no value"));
        }
        return Ok(Criterion::unary(field, operator));
    }
    if text.is_empty() {
        return Err(invalid("missing value"));
    }

    let value = match matching.resolve(entity, field) {
        Some(def) => {
            let operand = operand_type(&def.field_type, operator);
            let json = term_json(text, operand.scalar_type() == ScalarType::String && !operand.is_array());
            json_to_value(&json, &operand).map_err(|e| invalid(&e.to_string()))?
        }
        None => infer_value(&term_json(text, false)),
    };

    Ok(Criterion::new(field, operator, value))
}

/// Split off the first whitespace-delimited word.
fn split_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], s[end..].trim())),
        None => Some((s, "")),
    }
}

fn term_json(text: &str, string_operand: bool) -> JsonValue {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(json @ (JsonValue::String(_) | JsonValue::Null)) => json,
        Ok(json) if !string_operand => json,
        _ => JsonValue::String(text.to_string()),
    }
}
