//! Predicate compiler.
//!
//! Turns an ordered list of [`Criterion`]s into one [`CompiledPredicate`]: each
//! field name is resolved once to a reader, each operator to a function
//! pointer, and the terms are evaluated as a conjunction.

use std::borrow::Borrow;
use std::fmt;

use dynq_proto::{Criterion, Operator, Value};
use tracing::{debug, instrument, trace, warn};

use crate::catalog::{FieldDef, FieldType};
use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::operator::{no_match, operator_fn, OperatorFn};
use crate::query::Where;
use crate::record::{FieldReader, RecordType};

/// One criterion bound to its field reader and operator function.
struct BoundTerm<R: ?Sized> {
    /// The criterion with its field name replaced by the declared name.
    criterion: Criterion,
    read: FieldReader<R>,
    test: OperatorFn,
}

impl<R: ?Sized> BoundTerm<R> {
    #[inline]
    fn matches(&self, record: &R) -> bool {
        let source = (self.read)(record);
        (self.test)(&source, &self.criterion.value)
    }
}

impl<R: ?Sized> Clone for BoundTerm<R> {
    fn clone(&self) -> Self {
        Self {
            criterion: self.criterion.clone(),
            read: self.read.clone(),
            test: self.test,
        }
    }
}

/// A conjunctive predicate over records of type `R`.
///
/// Immutable once built. Cloning shares the field readers.
pub struct CompiledPredicate<R: ?Sized> {
    entity: String,
    terms: Vec<BoundTerm<R>>,
}

impl<R: ?Sized> CompiledPredicate<R> {
    /// The predicate with no terms, which accepts every record.
    pub fn always(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            terms: Vec::new(),
        }
    }

    /// Check whether a record satisfies every term.
    ///
    /// Terms run in criteria order and stop at the first failure.
    pub fn evaluate(&self, record: &R) -> bool {
        self.terms.iter().all(|term| term.matches(record))
    }

    /// Name of the entity the predicate was compiled for.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the predicate has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The bound criteria in evaluation order, with field names as declared
    /// by the entity.
    pub fn criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.terms.iter().map(|term| &term.criterion)
    }

    /// Conjunction of two predicates: the terms of `other` run after these.
    pub fn and(mut self, other: CompiledPredicate<R>) -> Self {
        self.terms.extend(other.terms);
        self
    }

    /// Convert into a closure over records.
    pub fn into_fn(self) -> impl Fn(&R) -> bool + Send + Sync
    where
        R: 'static,
    {
        move |record: &R| self.evaluate(record)
    }

    /// Keep the records that satisfy the predicate.
    pub fn filter<I>(&self, records: I) -> Where<'_, I::IntoIter, R>
    where
        I: IntoIterator,
        I::Item: Borrow<R>,
    {
        Where::new(records.into_iter(), self)
    }
}

impl<R: ?Sized> Clone for CompiledPredicate<R> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity.clone(),
            terms: self.terms.clone(),
        }
    }
}

impl<R: ?Sized> fmt::Debug for CompiledPredicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPredicate")
            .field("entity", &self.entity)
            .field("criteria", &self.criteria().collect::<Vec<_>>())
            .finish()
    }
}

impl<R: ?Sized> fmt::Display for CompiledPredicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}: *", self.entity);
        }
        write!(f, "{}: ", self.entity)?;
        for (i, criterion) in self.criteria().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", criterion)?;
        }
        Ok(())
    }
}

/// Compiles criteria against a record type.
#[derive(Debug, Clone, Default)]
pub struct PredicateCompiler {
    config: CompilerConfig,
}

impl PredicateCompiler {
    /// Create a compiler with the given configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile criteria into a single conjunctive predicate.
    ///
    /// Fails on the first criterion, in list order, that names an unknown
    /// field or applies an operator the field type cannot support.
    #[instrument(skip_all, fields(entity = %descriptor.entity().name, criteria = criteria.len()))]
    pub fn compile<D: RecordType>(
        &self,
        descriptor: &D,
        criteria: &[Criterion],
    ) -> Result<CompiledPredicate<D::Record>, CompileError> {
        if let Some(limit) = self.config.max_criteria {
            if criteria.len() > limit {
                return Err(CompileError::TooManyCriteria {
                    count: criteria.len(),
                    limit,
                });
            }
        }

        let mut predicate = CompiledPredicate::always(descriptor.entity().name.clone());
        for criterion in criteria {
            predicate.terms.push(self.bind(descriptor, criterion)?);
        }

        debug!(terms = predicate.len(), "compiled predicate");
        Ok(predicate)
    }

    fn bind<D: RecordType>(
        &self,
        descriptor: &D,
        criterion: &Criterion,
    ) -> Result<BoundTerm<D::Record>, CompileError> {
        let entity = descriptor.entity();
        let not_found = || CompileError::FieldNotFound {
            entity: entity.name.clone(),
            field: criterion.field.clone(),
        };

        let field = self
            .config
            .resolve_field(entity, &criterion.field)
            .ok_or_else(not_found)?;
        let read = descriptor.reader(field).ok_or_else(not_found)?;

        let operator = criterion.operator;
        let test = if !self.check_operand(field, criterion)? {
            warn!(
                field = %field.name,
                %operator,
                value = criterion.value.type_name(),
                "incompatible comparison value, term never matches"
            );
            no_match
        } else if operator.is_emptiness_check() && !field.field_type.supports_emptiness() {
            no_match
        } else {
            operator_fn(operator)
        };

        trace!(field = %field.name, field_type = %field.field_type, %operator, "bound term");
        Ok(BoundTerm {
            criterion: Criterion::new(field.name.clone(), operator, criterion.value.clone()),
            read,
            test,
        })
    }

    /// Type-check a criterion against its field.
    ///
    /// Returns `Ok(false)` for an incompatible comparison value when strict
    /// checking is off.
    fn check_operand(&self, field: &FieldDef, criterion: &Criterion) -> Result<bool, CompileError> {
        let operator = criterion.operator;
        if operator.is_ordering() && !field.field_type.is_orderable() {
            return Err(CompileError::UnsupportedOperatorForType {
                field: field.name.clone(),
                operator,
                field_type: field.field_type.to_string(),
            });
        }

        if !(operator.is_equality() || operator.is_ordering())
            || operand_fits(&field.field_type, operator, &criterion.value)
        {
            return Ok(true);
        }

        if self.config.strict_values {
            return Err(CompileError::IncompatibleValue {
                field: field.name.clone(),
                operator,
                expected: field.field_type.to_string(),
                actual: criterion.value.type_name().to_string(),
            });
        }
        Ok(false)
    }
}

fn operand_fits(field_type: &FieldType, operator: Operator, value: &Value) -> bool {
    if operator.is_ordering() && value.is_null() {
        return false;
    }
    field_type.accepts(value)
}

/// Compile criteria with the default configuration.
pub fn compile<D: RecordType>(
    descriptor: &D,
    criteria: &[Criterion],
) -> Result<CompiledPredicate<D::Record>, CompileError> {
    PredicateCompiler::default().compile(descriptor, criteria)
}
