use bson::Bson;

use super::compare::Comparators;
use super::types::{Clause, Conditions, Constraint, FilterMode};
use crate::errors::QueryError;

/// Where in the record a subject sits. The custom getter only applies at record scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'s> {
    Record,
    Field(&'s str),
    /// An element scanned by `$eleMatch` on the given field.
    Element(Option<&'s str>),
}

impl<'s> Scope<'s> {
    #[must_use]
    pub const fn field(self) -> Option<&'s str> {
        match self {
            Self::Record => None,
            Self::Field(f) => Some(f),
            Self::Element(f) => f,
        }
    }

    #[must_use]
    pub const fn is_record(self) -> bool {
        matches!(self, Self::Record)
    }
}

/// Capability shared by the constraint evaluator and the element matcher.
pub trait Matcher {
    fn comparators(&self) -> &Comparators;

    /// Does `subject` satisfy `constraint`?
    ///
    /// # Errors
    /// Callback failures.
    fn eval(&self, subject: Option<&Bson>, constraint: &Constraint, scope: Scope<'_>) -> Result<bool, QueryError>;

    /// Conjunction of the groups and clauses admitted by `mode`.
    ///
    /// # Errors
    /// Callback failures.
    fn eval_conditions(
        &self,
        subject: Option<&Bson>,
        conds: &Conditions,
        mode: FilterMode,
        scope: Scope<'_>,
    ) -> Result<bool, QueryError>;

    /// # Errors
    /// Callback failures.
    fn eval_clause(&self, subject: Option<&Bson>, clause: &Clause, scope: Scope<'_>) -> Result<bool, QueryError>;
}

/// Existential scan that stops at the first match and propagates the first error.
pub(crate) fn any_of<T>(
    items: impl IntoIterator<Item = T>,
    mut pred: impl FnMut(T) -> Result<bool, QueryError>,
) -> Result<bool, QueryError> {
    for item in items {
        if pred(item)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn all_of<T>(
    items: impl IntoIterator<Item = T>,
    mut pred: impl FnMut(T) -> Result<bool, QueryError>,
) -> Result<bool, QueryError> {
    for item in items {
        if !pred(item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate `constraint` under `mode`; only mappings distinguish modes.
///
/// # Errors
/// Callback failures.
pub(crate) fn eval_filtered(
    m: &dyn Matcher,
    value: Option<&Bson>,
    constraint: &Constraint,
    mode: FilterMode,
    scope: Scope<'_>,
) -> Result<bool, QueryError> {
    match constraint {
        Constraint::Doc(conds) if mode != FilterMode::All => m.eval_conditions(value, conds, mode, scope),
        _ => m.eval(value, constraint, scope),
    }
}

/// Checks the aggregate clauses of `constraint` against `whole`. Yields the mode for the
/// remaining existential pass, or `None` when an aggregate already fails.
///
/// # Errors
/// Callback failures.
pub(crate) fn split_aggregate(
    m: &dyn Matcher,
    whole: Option<&Bson>,
    constraint: &Constraint,
    mode: FilterMode,
    scope: Scope<'_>,
) -> Result<Option<FilterMode>, QueryError> {
    if mode == FilterMode::All
        && let Constraint::Doc(conds) = constraint
        && conds.has_aggregate()
    {
        if !m.eval_conditions(whole, conds, FilterMode::OnlyAggregate, scope)? {
            return Ok(None);
        }
        return Ok(Some(FilterMode::SkipAggregate));
    }
    Ok(Some(mode))
}

/// A nested sequence reached through a broadcast or an element scan. Aggregate
/// comparators see it whole; everything else holds when the sequence itself or any of
/// its elements satisfies it.
///
/// # Errors
/// Callback failures.
pub(crate) fn eval_spread(
    m: &dyn Matcher,
    whole: &Bson,
    items: &[Bson],
    constraint: &Constraint,
    mode: FilterMode,
    scope: Scope<'_>,
) -> Result<bool, QueryError> {
    let Some(mode) = split_aggregate(m, Some(whole), constraint, mode, scope)? else {
        return Ok(false);
    };
    if eval_filtered(m, Some(whole), constraint, mode, scope)? {
        return Ok(true);
    }
    any_of(items, |item| eval_filtered(m, Some(item), constraint, mode, scope))
}
