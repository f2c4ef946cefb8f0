//! dynq Command-Line Filter
//!
//! Loads an entity schema and a JSON record file, compiles the given criteria,
//! and prints the matching records.

mod formatter;
mod input;

use clap::Parser;
use dynq_core::{CompilerConfig, FieldMatching, PredicateCompiler};
use formatter::OutputFormat;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::filter::Directive;

/// dynq Command-Line Filter
#[derive(Parser, Debug)]
#[command(name = "dynq")]
#[command(version, about = "Filter JSON records with runtime criteria")]
pub struct Args {
    /// Entity schema file (JSON: {"name": .., "fields": [{"name": .., "type": ..}]})
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Records file (JSON array of objects)
    #[arg(short, long)]
    pub records: PathBuf,

    /// Criteria file (JSON array of {"field", "operator", "value"})
    #[arg(short, long)]
    pub criteria: Option<PathBuf>,

    /// Inline criterion "field operator [value]", applied after the criteria file
    #[arg(short = 'w', long = "where", value_name = "TERM")]
    pub terms: Vec<String>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Match field names exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Let criteria with incompatible values compile (they never match)
    #[arg(long)]
    pub lenient: bool,

    /// Maximum number of criteria
    #[arg(long)]
    pub max_criteria: Option<usize>,
}

impl Args {
    /// Compiler configuration selected by the flags.
    pub fn to_config(&self) -> CompilerConfig {
        let mut config = CompilerConfig::new().with_strict_values(!self.lenient);
        if self.case_sensitive {
            config = config.case_sensitive();
        }
        if let Some(limit) = self.max_criteria {
            config = config.with_max_criteria(limit);
        }
        config
    }

    fn field_matching(&self) -> FieldMatching {
        if self.case_sensitive {
            FieldMatching::Exact
        } else {
            FieldMatching::IgnoreCase
        }
    }
}

fn main() {
    // Initialize tracing
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "dynq_cli=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let entity = input::load_schema(&args.schema)?;
    let records = input::load_records(&args.records, &entity)?;
    debug!(entity = %entity.name, records = records.len(), "loaded records");

    let matching = args.field_matching();
    let mut criteria = match &args.criteria {
        Some(path) => input::load_criteria(path, &entity, matching)?,
        None => Vec::new(),
    };
    for term in &args.terms {
        criteria.push(input::parse_term(term, &entity, matching)?);
    }

    let compiler = PredicateCompiler::new(args.to_config());
    let predicate = compiler.compile(&entity, &criteria)?;
    info!(%predicate, "compiled filter");

    let matched: Vec<_> = predicate.filter(&records).collect();
    info!(matched = matched.len(), total = records.len(), "filtered records");

    let formatter = formatter::create_formatter(args.format);
    println!("{}", formatter.format_rows(&entity, &matched));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "dynq",
            "--schema",
            "user.json",
            "--records",
            "users.json",
            "-w",
            "name StartsWith Ali",
            "--where",
            "age >= 30",
            "--format",
            "json",
            "--case-sensitive",
            "--max-criteria",
            "8",
        ])
        .unwrap();

        assert_eq!(args.terms, vec!["name StartsWith Ali", "age >= 30"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.criteria.is_none());

        let config = args.to_config();
        assert_eq!(config.field_matching, FieldMatching::Exact);
        assert!(config.strict_values);
        assert_eq!(config.max_criteria, Some(8));
    }

    #[test]
    fn test_default_config() {
        let args = Args::try_parse_from(["dynq", "-s", "s.json", "-r", "r.json", "--lenient"]).unwrap();
        let config = args.to_config();
        assert_eq!(config.field_matching, FieldMatching::IgnoreCase);
        assert!(!config.strict_values);
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[test]
    fn test_missing_schema_rejected() {
        assert!(Args::try_parse_from(["dynq", "--records", "r.json"]).is_err());
    }
}
