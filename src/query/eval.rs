use bson::Bson;
use std::borrow::Cow;

use super::callback::{Callback, CallbackContext};
use super::compare::Comparators;
use super::element;
use super::matcher::{Matcher, Scope, all_of, any_of, eval_filtered, eval_spread, split_aggregate};
use super::types::{
    Clause, CompiledQuery, Conditions, Constraint, FieldPath, FilterMode, GroupMember, LogicOp,
    PathGroup,
};
use crate::errors::QueryError;
use crate::path::{self, FieldGetter, as_index};

/// Evaluate a compiled query against one record.
///
/// # Errors
/// Callback failures (`CallbackExecution`).
pub fn eval_query(
    record: &Bson,
    query: &CompiledQuery,
    comparators: &Comparators,
    getter: Option<&dyn FieldGetter>,
) -> Result<bool, QueryError> {
    Evaluator { record, comparators, getter }.eval(Some(record), &query.root, Scope::Record)
}

/// Per-record evaluation context.
struct Evaluator<'a> {
    record: &'a Bson,
    comparators: &'a Comparators,
    getter: Option<&'a dyn FieldGetter>,
}

impl Matcher for Evaluator<'_> {
    fn comparators(&self) -> &Comparators {
        self.comparators
    }

    fn eval(&self, subject: Option<&Bson>, constraint: &Constraint, scope: Scope<'_>) -> Result<bool, QueryError> {
        match constraint {
            Constraint::Never => Ok(false),
            Constraint::Literal(v) => Ok(subject.is_some_and(|s| self.comparators.eq(s, v))),
            Constraint::Any(alternatives) => any_of(alternatives, |c| self.eval(subject, c, scope)),
            Constraint::Doc(conds) => self.eval_conditions(subject, conds, FilterMode::All, scope),
        }
    }

    fn eval_conditions(
        &self,
        subject: Option<&Bson>,
        conds: &Conditions,
        mode: FilterMode,
        scope: Scope<'_>,
    ) -> Result<bool, QueryError> {
        if mode.admits_groups() && !all_of(&conds.groups, |g| self.eval_group(subject, g, scope))? {
            return Ok(false);
        }
        all_of(conds.clauses.iter().filter(|c| mode.admits(c)), |c| self.eval_clause(subject, c, scope))
    }

    fn eval_clause(&self, subject: Option<&Bson>, clause: &Clause, scope: Scope<'_>) -> Result<bool, QueryError> {
        match clause {
            Clause::Logic { op, operands } => self.eval_logic(*op, subject, operands, scope),
            Clause::Where(cb) => self.invoke(cb, subject, None, "$where"),
            Clause::Callback(cb) => self.invoke(cb, subject, scope.field(), "$cb"),
            Clause::Compare { op, operand } => Ok(self.comparators.apply(*op, subject, operand)),
            Clause::EleMatch(sub) => element::evaluate(self, subject, sub, scope.field()),
            Clause::Path { path, constraint } => self.eval_path(subject, path, constraint, scope),
        }
    }
}

impl Evaluator<'_> {
    fn eval_logic(
        &self,
        op: LogicOp,
        subject: Option<&Bson>,
        operands: &[Constraint],
        scope: Scope<'_>,
    ) -> Result<bool, QueryError> {
        let eval = |c: &Constraint| self.eval(subject, c, scope);
        match op {
            LogicOp::And => all_of(operands, eval),
            LogicOp::Or => any_of(operands, eval),
            LogicOp::Not | LogicOp::Nor => Ok(!any_of(operands, eval)?),
            LogicOp::Xor => {
                let mut passed = 0usize;
                for c in operands {
                    if eval(c)? {
                        passed += 1;
                    }
                }
                Ok(passed == 1)
            }
        }
    }

    fn invoke(
        &self,
        cb: &Callback,
        value: Option<&Bson>,
        field: Option<&str>,
        label: &str,
    ) -> Result<bool, QueryError> {
        let ctx = CallbackContext::new(self.record, field, value, self.comparators, self.getter);
        cb.invoke(&ctx, label)
    }

    // The custom getter only resolves paths written against the record itself.
    fn resolve_at_record<'r>(&'r self, scope: Scope<'_>, raw: &str) -> Option<Option<Cow<'r, Bson>>> {
        match self.getter {
            Some(g) if scope.is_record() => Some(g.get(self.record, raw)),
            _ => None,
        }
    }

    fn eval_path(
        &self,
        subject: Option<&Bson>,
        path: &FieldPath,
        constraint: &Constraint,
        scope: Scope<'_>,
    ) -> Result<bool, QueryError> {
        let field = Scope::Field(&path.raw);
        if let Some(value) = self.resolve_at_record(scope, &path.raw) {
            return self.eval(value.as_deref(), constraint, field);
        }
        self.match_path(subject, &path.segments, constraint, FilterMode::All, field, false)
    }

    // A group whose root is a non-empty sequence needs one element satisfying every
    // member; otherwise members are checked independently.
    fn eval_group(&self, subject: Option<&Bson>, group: &PathGroup, scope: Scope<'_>) -> Result<bool, QueryError> {
        let root = match self.resolve_at_record(scope, &group.root) {
            Some(v) => v,
            None => subject.and_then(|s| path::get_segments(s, std::slice::from_ref(&group.root))),
        };
        match root.as_deref() {
            Some(Bson::Array(items)) if !items.is_empty() => any_of(items, |item| {
                all_of(&group.members, |m| {
                    let field = Scope::Field(&m.path.raw);
                    self.match_path(Some(item), &m.rest, &m.constraint, FilterMode::All, field, true)
                })
            }),
            Some(Bson::Array(_)) => {
                all_of(&group.members, |m| self.eval(None, &m.constraint, Scope::Field(&m.path.raw)))
            }
            _ => all_of(&group.members, |m| self.eval_member(subject, m, scope)),
        }
    }

    fn eval_member(&self, subject: Option<&Bson>, m: &GroupMember, scope: Scope<'_>) -> Result<bool, QueryError> {
        self.eval_path(subject, &m.path, &m.constraint, scope)
    }

    // `spread` is set once the path has passed through a sequence; a sequence found at
    // the end of such a path is tested element by element.
    fn match_path(
        &self,
        value: Option<&Bson>,
        segs: &[String],
        constraint: &Constraint,
        mode: FilterMode,
        scope: Scope<'_>,
        spread: bool,
    ) -> Result<bool, QueryError> {
        let Some((head, rest)) = segs.split_first() else {
            return match value {
                Some(whole @ Bson::Array(items)) if spread => {
                    eval_spread(self, whole, items, constraint, mode, scope)
                }
                _ => eval_filtered(self, value, constraint, mode, scope),
            };
        };
        match value {
            Some(Bson::Array(items)) => match as_index(head) {
                Some(i) => self.match_path(items.get(i), rest, constraint, mode, scope, spread),
                None => self.match_broadcast(items, segs, constraint, mode, scope),
            },
            Some(Bson::Document(doc)) => {
                self.match_path(doc.get(head.as_str()), rest, constraint, mode, scope, spread)
            }
            _ => eval_filtered(self, None, constraint, mode, scope),
        }
    }

    // Path continues through a sequence: aggregate comparators see the broadcast,
    // flattened value as a whole; everything else must hold for some element.
    fn match_broadcast(
        &self,
        items: &[Bson],
        segs: &[String],
        constraint: &Constraint,
        mode: FilterMode,
        scope: Scope<'_>,
    ) -> Result<bool, QueryError> {
        if items.is_empty() {
            return eval_filtered(self, None, constraint, mode, scope);
        }
        let aggregate = mode == FilterMode::All && matches!(constraint, Constraint::Doc(c) if c.has_aggregate());
        let whole = if aggregate { path::broadcast(items, segs) } else { None };
        let Some(mode) = split_aggregate(self, whole.as_ref(), constraint, mode, scope)? else {
            return Ok(false);
        };
        any_of(items, |item| self.match_path(Some(item), segs, constraint, mode, scope, true))
    }
}
