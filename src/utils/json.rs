use bson::{Bson, Document};
use serde_json::{Map, Number, Value};

use crate::errors::QueryError;

/// Convert a `serde_json::Value` into `Bson`.
///
/// Integers that fit in 32 bits become `Int32`, larger ones `Int64`; anything that only
/// fits a float becomes `Double`.
#[must_use]
pub fn json_to_bson(val: &Value) -> Bson {
    match val {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => number_to_bson(n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => {
            let mut doc = Document::new();
            for (k, v) in map {
                doc.insert(k.clone(), json_to_bson(v));
            }
            Bson::Document(doc)
        }
    }
}

fn number_to_bson(n: &Number) -> Bson {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32);
    }
    Bson::Double(n.as_f64().unwrap_or(f64::NAN))
}

/// Convert `Bson` into relaxed JSON for output. Types without a JSON counterpart
/// (object ids, binaries, timestamps) are rendered as strings.
#[must_use]
pub fn bson_to_json(val: &Bson) -> Value {
    match val {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => {
            let mut map = Map::new();
            for (k, v) in doc {
                map.insert(k.to_string(), bson_to_json(v));
            }
            Value::Object(map)
        }
        Bson::DateTime(dt) => chrono::DateTime::<chrono::Utc>::from_timestamp_millis(
            dt.timestamp_millis(),
        )
        .map_or(Value::Null, |d| Value::String(d.to_rfc3339())),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        other => Value::String(other.to_string()),
    }
}

/// Parse JSON text into a `Bson` value (records or query documents).
///
/// # Errors
/// Returns `QueryError::Json` if the text is not valid JSON.
pub fn parse_json(text: &str) -> Result<Bson, QueryError> {
    let val: Value = serde_json::from_str(text)?;
    Ok(json_to_bson(&val))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;

    #[test]
    fn json_to_bson_picks_narrowest_integer() {
        let b = parse_json(r#"{"a":1,"b":5000000000,"c":1.5,"d":[true,null]}"#).unwrap();
        assert_eq!(b, bson!({"a": 1_i32, "b": 5_000_000_000_i64, "c": 1.5, "d": [true, null]}));
    }

    #[test]
    fn bson_to_json_round_trips_plain_values() {
        let b = bson!({"name": "x", "n": [1, 2], "nested": {"ok": false}});
        let v = bson_to_json(&b);
        assert_eq!(v, serde_json::json!({"name": "x", "n": [1, 2], "nested": {"ok": false}}));
    }

    #[test]
    fn parse_json_rejects_garbage() {
        assert!(matches!(parse_json("{nope"), Err(QueryError::Json(_))));
    }
}
