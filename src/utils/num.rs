//! Numeric utilities: centralized coercions between BSON numbers and Rust primitives.
//!
//! Guidelines
//! - Integer-valued BSON numbers (Int32/Int64, integral Double) compare as integers.
//! - Everything else numeric goes through `f64`; NaN never equals or orders.
//! - Non-numeric values coerce to `None`, never to zero.

use bson::Bson;

#[inline]
#[must_use]
pub fn as_f64(v: &Bson) -> Option<f64> {
    match v {
        Bson::Int32(i) => Some(f64::from(*i)),
        #[allow(clippy::cast_precision_loss)]
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => d.to_string().parse::<f64>().ok(),
        _ => None,
    }
}

#[inline]
#[must_use]
pub fn as_i64(v: &Bson) -> Option<i64> {
    match v {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        Bson::Double(f) => f64_to_i64_exact(*f),
        _ => None,
    }
}

#[inline]
#[must_use]
pub fn is_number(v: &Bson) -> bool {
    matches!(v, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

/// Lossless conversion of an integral float; `None` for fractional or out-of-range values.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn f64_to_i64_exact(v: f64) -> Option<i64> {
    if !v.is_finite() || v.fract() != 0.0 {
        return None;
    }
    if v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}

#[inline]
#[must_use]
pub fn usize_to_i64_saturating(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Renders a float the way a human reads it back: integral values print without a fraction.
#[must_use]
pub fn format_f64(v: f64) -> String {
    match f64_to_i64_exact(v) {
        Some(i) if i.unsigned_abs() < 1_000_000_000_000_000 => i.to_string(),
        _ => v.to_string(),
    }
}
