//! `$eleMatch`: existential matching of a sub-query against the elements of a sequence.
//!
//! Rules, first applicable wins:
//! 1. empty sequence never matches;
//! 2. a scalar sub-query matches when any element equals it;
//! 3. direct `$size` clauses hold for the sequence itself, the rest is existential;
//! 4. a single plain key whose value in an element is itself a sequence: aggregates see
//!    that nested sequence whole, every other condition holds for some nested element;
//! 5. otherwise some element, evaluated as a record, satisfies the whole sub-query.
//!    Logical combinators, dot-qualified keys and nested `$eleMatch` (multi-dimensional
//!    sequences) resolve through the shared matcher.
//!
//! A mapping candidate is accepted only when the sub-query has dot-qualified keys; the
//! sub-query is then evaluated against the mapping so a nested sequence can be reached.

use bson::Bson;

use super::matcher::{Matcher, Scope, all_of, any_of, eval_spread};
use super::types::{Clause, Conditions, Constraint, FieldPath, FilterMode};
use crate::errors::QueryError;

/// Evaluate `$eleMatch` with `sub` against `candidate`.
///
/// # Errors
/// Callback failures inside the sub-query.
pub fn evaluate(
    m: &dyn Matcher,
    candidate: Option<&Bson>,
    sub: &Constraint,
    field: Option<&str>,
) -> Result<bool, QueryError> {
    let scope = Scope::Element(field);
    match candidate {
        Some(whole @ Bson::Array(items)) => match_elements(m, whole, items, sub, scope),
        Some(doc @ Bson::Document(_)) => match sub {
            Constraint::Doc(conds) if !conds.groups.is_empty() => {
                m.eval_conditions(Some(doc), conds, FilterMode::All, scope)
            }
            _ => Ok(false),
        },
        _ => Ok(false),
    }
}

fn match_elements(
    m: &dyn Matcher,
    whole: &Bson,
    items: &[Bson],
    sub: &Constraint,
    scope: Scope<'_>,
) -> Result<bool, QueryError> {
    if items.is_empty() {
        return Ok(false);
    }
    match sub {
        Constraint::Never => Ok(false),
        Constraint::Literal(v) => Ok(items.iter().any(|x| m.comparators().eq(x, v))),
        Constraint::Doc(conds) if conds.size_clauses().next().is_some() => {
            if !all_of(conds.size_clauses(), |c| m.eval_clause(Some(whole), c, scope))? {
                return Ok(false);
            }
            any_of(items, |x| m.eval_conditions(Some(x), conds, FilterMode::SkipSize, scope))
        }
        Constraint::Doc(conds) => match single_plain_key(conds) {
            Some((path, constraint)) => {
                let field = Scope::Field(&path.raw);
                any_of(items, |x| match nested_sequence(x, &path.segments[0]) {
                    Some((seq, inner)) => eval_spread(m, seq, inner, constraint, FilterMode::All, field),
                    None => m.eval(Some(x), sub, scope),
                })
            }
            None => any_of(items, |x| m.eval(Some(x), sub, scope)),
        },
        Constraint::Any(_) => any_of(items, |x| m.eval(Some(x), sub, scope)),
    }
}

fn single_plain_key(conds: &Conditions) -> Option<(&FieldPath, &Constraint)> {
    match (conds.groups.as_slice(), conds.clauses.as_slice()) {
        ([], [Clause::Path { path, constraint }]) if path.segments.len() == 1 => Some((path, constraint)),
        _ => None,
    }
}

fn nested_sequence<'a>(element: &'a Bson, key: &str) -> Option<(&'a Bson, &'a [Bson])> {
    match element.as_document()?.get(key)? {
        seq @ Bson::Array(inner) => Some((seq, inner.as_slice())),
        _ => None,
    }
}
