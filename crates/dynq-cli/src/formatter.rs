//! Output formatters for matched records.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use dynq_core::{EntityDef, Row};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format matched records of an entity.
    fn format_rows(&self, entity: &EntityDef, rows: &[&Row]) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_rows(&self, entity: &EntityDef, rows: &[&Row]) -> String {
        if rows.is_empty() {
            return "No results".to_string();
        }

        let mut table = Table::new();
        table.set_header(entity.field_names().map(Cell::new).collect::<Vec<_>>());

        for row in rows {
            let cells: Vec<Cell> = (0..entity.fields.len())
                .map(|slot| Cell::new(row.get(slot)))
                .collect();
            table.add_row(cells);
        }

        format!("{}\n{} row(s)", table, rows.len())
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_rows(&self, entity: &EntityDef, rows: &[&Row]) -> String {
        let array: Vec<serde_json::Value> = rows.iter().map(|row| row.to_json(entity)).collect();
        serde_json::to_string_pretty(&array).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynq_core::{FieldDef, ScalarType};
    use dynq_proto::Value;

    fn fixture() -> (EntityDef, Vec<Row>) {
        let entity = EntityDef::new("User")
            .with_field(FieldDef::scalar("name", ScalarType::String))
            .with_field(FieldDef::optional_scalar("age", ScalarType::Int32));
        let rows = vec![
            Row::new(vec![Value::from("Alice"), Value::Int32(30)]),
            Row::new(vec![Value::from("Bob"), Value::Null]),
        ];
        (entity, rows)
    }

    #[test]
    fn test_table_output() {
        let (entity, rows) = fixture();
        let refs: Vec<&Row> = rows.iter().collect();
        let output = create_formatter(OutputFormat::Table).format_rows(&entity, &refs);

        assert!(output.contains("name"));
        assert!(output.contains("Alice"));
        assert!(output.contains("NULL"));
        assert!(output.ends_with("2 row(s)"));

        assert_eq!(TableFormatter.format_rows(&entity, &[]), "No results");
    }

    #[test]
    fn test_json_output() {
        let (entity, rows) = fixture();
        let refs: Vec<&Row> = rows.iter().collect();
        let output = JsonFormatter.format_rows(&entity, &refs);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([
                {"name": "Alice", "age": 30},
                {"name": "Bob", "age": null}
            ])
        );
        assert_eq!(JsonFormatter.format_rows(&entity, &[]), "[]");
    }

    #[test]
    fn test_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
