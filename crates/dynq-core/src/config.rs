//! Compiler configuration.

use serde::{Deserialize, Serialize};

use crate::catalog::{EntityDef, FieldDef};

/// Default upper bound on the number of criteria in one filter.
pub const DEFAULT_MAX_CRITERIA: usize = 256;

/// How criterion field names are matched against the entity's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldMatching {
    /// Names must match exactly.
    Exact,
    /// Exact match first, then an ASCII case-insensitive match.
    #[default]
    IgnoreCase,
}

impl FieldMatching {
    /// Look up a field on an entity using this matching rule.
    pub fn resolve<'a>(&self, entity: &'a EntityDef, name: &str) -> Option<&'a FieldDef> {
        match self {
            FieldMatching::Exact => entity.get_field(name),
            FieldMatching::IgnoreCase => entity.get_field_ignore_case(name),
        }
    }
}

/// Predicate compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Field name matching rule.
    pub field_matching: FieldMatching,

    /// Reject equality/ordering criteria whose value cannot be compared with
    /// the field type. When off, such criteria compile and never match.
    pub strict_values: bool,

    /// Maximum number of criteria per filter. `None` disables the limit.
    pub max_criteria: Option<usize>,
}

impl CompilerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            field_matching: FieldMatching::default(),
            strict_values: true,
            max_criteria: Some(DEFAULT_MAX_CRITERIA),
        }
    }

    /// Set the field matching rule.
    pub fn with_field_matching(mut self, matching: FieldMatching) -> Self {
        self.field_matching = matching;
        self
    }

    /// Require exact field names.
    pub fn case_sensitive(self) -> Self {
        self.with_field_matching(FieldMatching::Exact)
    }

    /// Enable or disable value type checking.
    pub fn with_strict_values(mut self, strict: bool) -> Self {
        self.strict_values = strict;
        self
    }

    /// Set the maximum number of criteria.
    pub fn with_max_criteria(mut self, limit: usize) -> Self {
        self.max_criteria = Some(limit);
        self
    }

    /// Remove the criteria limit.
    pub fn without_criteria_limit(mut self) -> Self {
        self.max_criteria = None;
        self
    }

    /// Resolve a field name using the configured matching rule.
    pub fn resolve_field<'a>(&self, entity: &'a EntityDef, name: &str) -> Option<&'a FieldDef> {
        self.field_matching.resolve(entity, name)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScalarType;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.field_matching, FieldMatching::IgnoreCase);
        assert!(config.strict_values);
        assert_eq!(config.max_criteria, Some(DEFAULT_MAX_CRITERIA));
    }

    #[test]
    fn test_builder() {
        let config = CompilerConfig::new()
            .case_sensitive()
            .with_strict_values(false)
            .with_max_criteria(4);
        assert_eq!(config.field_matching, FieldMatching::Exact);
        assert!(!config.strict_values);
        assert_eq!(config.max_criteria, Some(4));
        assert_eq!(config.without_criteria_limit().max_criteria, None);
    }

    #[test]
    fn test_resolve_field() {
        let entity = EntityDef::new("User").with_field(FieldDef::scalar("Name", ScalarType::String));

        assert!(CompilerConfig::new().resolve_field(&entity, "name").is_some());
        assert!(CompilerConfig::new().case_sensitive().resolve_field(&entity, "name").is_none());
        assert!(CompilerConfig::new().case_sensitive().resolve_field(&entity, "Name").is_some());
    }

    #[test]
    fn test_partial_json() {
        let config: CompilerConfig = serde_json::from_str(r#"{"strict_values": false}"#).unwrap();
        assert!(!config.strict_values);
        assert_eq!(config.field_matching, FieldMatching::IgnoreCase);
        assert_eq!(config.max_criteria, Some(DEFAULT_MAX_CRITERIA));
    }
}
