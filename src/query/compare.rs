//! The comparator registry: pure, total `(actual, operand) -> bool` operators.
//!
//! Comparators never fail on mismatched types; they return `false`. An absent actual
//! value only satisfies `$exists`, `$ne`, `$nin` and `$type: "undefined"`.

use bson::Bson;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::parse::compile_operand;
use super::types::{CompareOp, Operand, SizeOperand};
use crate::dates::{DateComparer, DateParser};
use crate::errors::QueryError;
use crate::utils::num::{as_f64, as_i64, is_number, usize_to_i64_saturating};
use crate::utils::values::{bson_alias, deep_equal, stringify, type_of};

/// One immutable registry per engine.
#[derive(Clone)]
pub struct Comparators {
    dates: Arc<dyn DateComparer>,
}

impl fmt::Debug for Comparators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparators").finish_non_exhaustive()
    }
}

impl Default for Comparators {
    fn default() -> Self {
        Self::new(Arc::new(DateParser::default()))
    }
}

impl Comparators {
    /// Operators that work on sequences as a whole.
    pub const ARRAY_OPERATORS: [&'static str; 6] =
        ["$in", "$nin", "$contains", "$containsAll", "$containsAny", "$size"];

    #[must_use]
    pub fn new(dates: Arc<dyn DateComparer>) -> Self {
        Self { dates }
    }

    /// Date-aware equality, falling back to deep value equality.
    #[must_use]
    pub fn eq(&self, a: &Bson, b: &Bson) -> bool {
        match self.dates.compare(a, b) {
            Some(ord) => ord == Ordering::Equal,
            None => deep_equal(a, b),
        }
    }

    /// Date-aware natural ordering. `None` for values of unrelated types.
    #[must_use]
    pub fn order(&self, a: &Bson, b: &Bson) -> Option<Ordering> {
        if let Some(ord) = self.dates.compare(a, b) {
            return Some(ord);
        }
        if is_number(a) && is_number(b) {
            if let (Some(x), Some(y)) = (as_i64(a), as_i64(b)) {
                return Some(x.cmp(&y));
            }
            return as_f64(a)?.partial_cmp(&as_f64(b)?);
        }
        match (a, b) {
            (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
            (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
            (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
            _ => None,
        }
    }

    #[must_use]
    pub fn gt(&self, a: &Bson, b: &Bson) -> bool {
        self.order(a, b) == Some(Ordering::Greater)
    }

    #[must_use]
    pub fn gte(&self, a: &Bson, b: &Bson) -> bool {
        self.gt(a, b) || self.eq(a, b)
    }

    #[must_use]
    pub fn lt(&self, a: &Bson, b: &Bson) -> bool {
        self.order(a, b) == Some(Ordering::Less)
    }

    #[must_use]
    pub fn lte(&self, a: &Bson, b: &Bson) -> bool {
        self.lt(a, b) || self.eq(a, b)
    }

    /// Apply a compiled comparator. Ordering and string operators given a sequence hold
    /// when any element satisfies them.
    #[must_use]
    pub fn apply(&self, op: CompareOp, actual: Option<&Bson>, operand: &Operand) -> bool {
        if op.fans_out()
            && let Some(Bson::Array(items)) = actual
        {
            return items.iter().any(|item| self.apply(op, Some(item), operand));
        }
        match operand {
            Operand::Value(v) => self.apply_value(op, actual, v),
            Operand::Pattern(re) => match (re, actual) {
                (Some(re), Some(a)) => re.is_match(&stringify(a)),
                _ => false,
            },
            Operand::Size(size) => match actual {
                Some(Bson::Array(items)) => self.size_matches(items.len(), size),
                _ => false,
            },
        }
    }

    /// By-name lookup, for callbacks composing their own checks.
    ///
    /// # Errors
    /// `UnsupportedOperator` when `name` is not a comparator.
    pub fn compare(&self, name: &str, actual: Option<&Bson>, operand: &Bson) -> Result<bool, QueryError> {
        let op = CompareOp::from_name(name).ok_or_else(|| QueryError::UnsupportedOperator(name.to_string()))?;
        let operand = compile_operand(op, operand)?;
        Ok(self.apply(op, actual, &operand))
    }

    fn apply_value(&self, op: CompareOp, actual: Option<&Bson>, v: &Bson) -> bool {
        match op {
            CompareOp::Ne => return !self.apply_value(CompareOp::Eq, actual, v),
            CompareOp::Nin => return !self.apply_value(CompareOp::In, actual, v),
            CompareOp::Exists => return matches!(v, Bson::Boolean(b) if actual.is_some() == *b),
            CompareOp::Type => {
                return matches!(v, Bson::String(t)
                    if type_of(actual) == t.as_str() || actual.and_then(bson_alias) == Some(t.as_str()));
            }
            _ => {}
        }
        let Some(a) = actual else { return false };
        match op {
            CompareOp::Eq => self.eq(a, v),
            CompareOp::Gt => self.gt(a, v),
            CompareOp::Gte => self.gte(a, v),
            CompareOp::Lt => self.lt(a, v),
            CompareOp::Lte => self.lte(a, v),
            CompareOp::In => self.is_in(a, v),
            CompareOp::Contains => matches!(a, Bson::Array(xs) if self.any_eq(xs, v)),
            CompareOp::ContainsAll => match (a, v) {
                (Bson::Array(xs), Bson::Array(want)) => want.iter().all(|w| self.any_eq(xs, w)),
                _ => false,
            },
            CompareOp::ContainsAny => match (a, v) {
                (Bson::Array(xs), Bson::Array(want)) => want.iter().any(|w| self.any_eq(xs, w)),
                _ => false,
            },
            CompareOp::Size => match a {
                Bson::Array(items) => self.size_matches(items.len(), &SizeOperand::Exact(v.clone())),
                _ => false,
            },
            CompareOp::Regex => false,
            CompareOp::Mod => modulo_matches(a, v),
            CompareOp::Between => match v {
                Bson::Array(bounds) if bounds.len() == 2 => {
                    self.gte(a, &bounds[0]) && self.lte(a, &bounds[1])
                }
                _ => false,
            },
            CompareOp::StartsWith => stringify(a).starts_with(&stringify(v)),
            CompareOp::EndsWith => stringify(a).ends_with(&stringify(v)),
            CompareOp::Includes => stringify(a).contains(&stringify(v)),
            CompareOp::Length => {
                as_i64(v) == Some(usize_to_i64_saturating(stringify(a).chars().count()))
            }
            CompareOp::Ne | CompareOp::Nin | CompareOp::Exists | CompareOp::Type => false,
        }
    }

    fn any_eq(&self, haystack: &[Bson], needle: &Bson) -> bool {
        haystack.iter().any(|x| self.eq(x, needle))
    }

    // A sequence actual is "in" when any of its elements is, or when the whole sequence
    // equals one of the operand's elements.
    fn is_in(&self, actual: &Bson, operand: &Bson) -> bool {
        let Bson::Array(choices) = operand else { return false };
        if let Bson::Array(items) = actual
            && items.iter().any(|x| self.any_eq(choices, x))
        {
            return true;
        }
        self.any_eq(choices, actual)
    }

    fn size_matches(&self, len: usize, size: &SizeOperand) -> bool {
        let len = Bson::Int64(usize_to_i64_saturating(len));
        match size {
            SizeOperand::Exact(n) => is_number(n) && deep_equal(&len, n),
            SizeOperand::Checks(checks) => checks.iter().all(|(op, operand)| self.apply(*op, Some(&len), operand)),
            SizeOperand::Unsatisfiable => false,
        }
    }
}

fn modulo_matches(actual: &Bson, operand: &Bson) -> bool {
    let Bson::Array(parts) = operand else { return false };
    let [divisor, remainder] = parts.as_slice() else { return false };
    if let (Some(a), Some(d), Some(r)) = (as_i64(actual), as_i64(divisor), as_i64(remainder)) {
        return a.checked_rem(d) == Some(r);
    }
    match (as_f64(actual), as_f64(divisor), as_f64(remainder)) {
        #[allow(clippy::float_cmp)]
        (Some(a), Some(d), Some(r)) if d != 0.0 => a % d == r,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;

    fn val(v: Bson) -> Operand {
        Operand::Value(v)
    }

    #[test]
    fn ordering_is_type_aware() {
        let c = Comparators::default();
        assert!(c.gt(&Bson::Int32(5), &Bson::Double(4.5)));
        assert!(c.lt(&Bson::String("apple".into()), &Bson::String("banana".into())));
        assert!(!c.gt(&Bson::String("5".into()), &Bson::Int32(4)));
        assert!(!c.lt(&Bson::String("5".into()), &Bson::Int32(4)));
        assert!(c.gte(&Bson::Int64(3), &Bson::Int32(3)));
    }

    #[test]
    fn dates_compare_chronologically() {
        let c = Comparators::default();
        let a = Bson::String("01/15/2023".into());
        let b = Bson::String("2023-01-15".into());
        assert!(c.eq(&a, &b));
        assert!(c.lt(&b, &Bson::String("2023-02-01".into())));
    }

    #[test]
    fn absent_values_only_satisfy_negative_checks() {
        let c = Comparators::default();
        assert!(!c.apply(CompareOp::Eq, None, &val(Bson::Null)));
        assert!(c.apply(CompareOp::Ne, None, &val(Bson::Int32(1))));
        assert!(c.apply(CompareOp::Nin, None, &val(bson!([1]))));
        assert!(c.apply(CompareOp::Exists, None, &val(Bson::Boolean(false))));
        assert!(c.apply(CompareOp::Type, None, &val(Bson::String("undefined".into()))));
        assert!(!c.apply(CompareOp::Gt, None, &val(Bson::Int32(0))));
    }

    #[test]
    fn in_accepts_sequence_actuals() {
        let c = Comparators::default();
        assert!(c.apply(CompareOp::In, Some(&bson!(["a", "b"])), &val(bson!(["b", "z"]))));
        assert!(c.apply(CompareOp::In, Some(&bson!([1, 2])), &val(bson!([[1, 2]]))));
        assert!(!c.apply(CompareOp::In, Some(&Bson::Int32(1)), &val(Bson::Int32(1))));
    }

    #[test]
    fn mod_handles_zero_divisor() {
        let c = Comparators::default();
        assert!(c.apply(CompareOp::Mod, Some(&Bson::Int32(10)), &val(bson!([3, 1]))));
        assert!(!c.apply(CompareOp::Mod, Some(&Bson::Int32(10)), &val(bson!([0, 0]))));
        assert!(c.apply(CompareOp::Mod, Some(&Bson::Double(7.5)), &val(bson!([2, 1.5]))));
    }

    #[test]
    fn type_accepts_bson_aliases() {
        let c = Comparators::default();
        let t = |s: &str| val(Bson::String(s.into()));
        assert!(c.apply(CompareOp::Type, Some(&Bson::Int64(1)), &t("number")));
        assert!(c.apply(CompareOp::Type, Some(&Bson::Int64(1)), &t("long")));
        assert!(!c.apply(CompareOp::Type, Some(&Bson::Int64(1)), &t("string")));
    }

    #[test]
    fn ordering_fans_out_over_sequences() {
        let c = Comparators::default();
        assert!(c.apply(CompareOp::Gt, Some(&bson!([1, 9])), &val(Bson::Int32(5))));
        assert!(!c.apply(CompareOp::Eq, Some(&bson!([1, 9])), &val(Bson::Int32(9))));
    }

    #[test]
    fn by_name_lookup_rejects_unknown_names() {
        let c = Comparators::default();
        assert!(c.compare("$length", Some(&Bson::String("abc".into())), &Bson::Int32(3)).unwrap());
        assert!(matches!(
            c.compare("$and", None, &Bson::Null),
            Err(QueryError::UnsupportedOperator(_))
        ));
    }
}
