//! Value-level helpers shared by the comparators, callbacks and the CLI.

use bson::Bson;

use super::num::{as_f64, as_i64, format_f64, is_number};

/// Runtime type tag of a (possibly absent) value.
#[must_use]
pub fn type_of(val: Option<&Bson>) -> &'static str {
    match val {
        None | Some(Bson::Undefined) => "undefined",
        Some(Bson::Null) => "null",
        Some(Bson::Array(_)) => "array",
        Some(Bson::Document(_)) => "object",
        Some(Bson::String(_) | Bson::Symbol(_)) => "string",
        Some(Bson::Boolean(_)) => "boolean",
        Some(v) if is_number(v) => "number",
        Some(Bson::DateTime(_)) => "date",
        Some(Bson::ObjectId(_)) => "objectId",
        Some(Bson::Binary(_)) => "binData",
        Some(Bson::RegularExpression(_)) => "regex",
        Some(Bson::Timestamp(_)) => "timestamp",
        Some(_) => "object",
    }
}

/// BSON-specific alias of a value's type, when one exists (`int`, `long`, ...).
#[must_use]
pub fn bson_alias(val: &Bson) -> Option<&'static str> {
    match val {
        Bson::Int32(_) => Some("int"),
        Bson::Int64(_) => Some("long"),
        Bson::Double(_) => Some("double"),
        Bson::Decimal128(_) => Some("decimal"),
        Bson::Boolean(_) => Some("bool"),
        _ => None,
    }
}

/// Absent, null or empty string.
#[must_use]
pub fn is_na(val: Option<&Bson>) -> bool {
    match val {
        None | Some(Bson::Null | Bson::Undefined) => true,
        Some(Bson::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Structural equality. Numbers compare by value across Int32/Int64/Double; mappings
/// compare as unordered key sets; sequences compare element-wise in order.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn deep_equal(a: &Bson, b: &Bson) -> bool {
    if is_number(a) && is_number(b) {
        if let (Some(x), Some(y)) = (as_i64(a), as_i64(b)) {
            return x == y;
        }
        return matches!((as_f64(a), as_f64(b)), (Some(x), Some(y)) if x == y);
    }
    match (a, b) {
        (Bson::Array(xs), Bson::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Bson::Document(x), Bson::Document(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, xv)| y.get(k.as_str()).is_some_and(|yv| deep_equal(xv, yv)))
        }
        _ => a == b,
    }
}

/// True iff some element of `haystack` deep-equals `needle`.
#[must_use]
pub fn contains(haystack: &[Bson], needle: &Bson) -> bool {
    haystack.iter().any(|x| deep_equal(x, needle))
}

/// Elements of `a` that also appear in `b`, in `a`'s order.
#[must_use]
pub fn intersection(a: &[Bson], b: &[Bson]) -> Vec<Bson> {
    a.iter().filter(|x| contains(b, x)).cloned().collect()
}

/// Elements of `a` that do not appear in `b`, in `a`'s order.
#[must_use]
pub fn difference(a: &[Bson], b: &[Bson]) -> Vec<Bson> {
    a.iter().filter(|x| !contains(b, x)).cloned().collect()
}

/// String form used by the string-level comparators (`$regex`, `$startsWith`, ...).
/// Sequences join their elements with commas; mappings render as JSON.
#[must_use]
pub fn stringify(val: &Bson) -> String {
    match val {
        Bson::String(s) | Bson::Symbol(s) => s.clone(),
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::Double(f) => format_f64(*f),
        Bson::Boolean(b) => b.to_string(),
        Bson::Null => "null".to_string(),
        Bson::Undefined => "undefined".to_string(),
        Bson::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Bson::Document(_) | Bson::DateTime(_) => super::json::bson_to_json(val).to_string(),
        other => other.to_string(),
    }
}
