//! Filtering iterators with compiled predicates.

use std::borrow::Borrow;
use std::iter::FusedIterator;

use dynq_proto::Criterion;
use tracing::debug;

use crate::compiler::{compile, CompiledPredicate};
use crate::error::CompileError;
use crate::record::RecordType;

/// Iterator adapter that yields the items satisfying a predicate.
///
/// Created by [`DynamicWhere::dynamic_where`] and [`CompiledPredicate::filter`].
#[derive(Debug, Clone)]
pub struct Where<'a, I, R: ?Sized> {
    iter: I,
    predicate: &'a CompiledPredicate<R>,
}

impl<'a, I, R: ?Sized> Where<'a, I, R> {
    pub(crate) fn new(iter: I, predicate: &'a CompiledPredicate<R>) -> Self {
        Self { iter, predicate }
    }
}

impl<I, R> Iterator for Where<'_, I, R>
where
    I: Iterator,
    I::Item: Borrow<R>,
    R: ?Sized,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let predicate = self.predicate;
        self.iter.find(|item| predicate.evaluate(item.borrow()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}

impl<I, R> DoubleEndedIterator for Where<'_, I, R>
where
    I: DoubleEndedIterator,
    I::Item: Borrow<R>,
    R: ?Sized,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let predicate = self.predicate;
        self.iter.rfind(|item| predicate.evaluate(item.borrow()))
    }
}

impl<I, R> FusedIterator for Where<'_, I, R>
where
    I: FusedIterator,
    I::Item: Borrow<R>,
    R: ?Sized,
{
}

/// Adds `dynamic_where` to every iterator.
pub trait DynamicWhere: Iterator + Sized {
    /// Keep the items whose record satisfies `predicate`.
    ///
    /// ```ignore
    /// let adults: Vec<&Row> = rows.iter().dynamic_where(&predicate).collect();
    /// ```
    fn dynamic_where<R>(self, predicate: &CompiledPredicate<R>) -> Where<'_, Self, R>
    where
        R: ?Sized,
        Self::Item: Borrow<R>,
    {
        Where::new(self, predicate)
    }
}

impl<I: Iterator> DynamicWhere for I {}

/// Compile `criteria` and collect the matching records.
///
/// Compile errors are returned before any record is read.
pub fn filter_records<D, I>(
    descriptor: &D,
    criteria: &[Criterion],
    records: I,
) -> Result<Vec<I::Item>, CompileError>
where
    D: RecordType,
    I: IntoIterator,
    I::Item: Borrow<D::Record>,
{
    let predicate = compile(descriptor, criteria)?;
    let matched: Vec<I::Item> = predicate.filter(records).collect();
    debug!(entity = predicate.entity(), matched = matched.len(), "filtered records");
    Ok(matched)
}
