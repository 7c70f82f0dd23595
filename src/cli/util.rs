use bson::Bson;
use std::io::Read;
use std::path::Path;

use crate::errors::QueryError;
use crate::utils::json::parse_json;

/// Inline text, or the contents of the file named after a leading `@`.
///
/// # Errors
/// `QueryError::Io` when the referenced file cannot be read.
pub fn read_arg_text(arg: &str) -> Result<String, QueryError> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(arg.to_string()),
    }
}

/// Parse a JSON argument (inline or `@path`).
///
/// # Errors
/// I/O or JSON failures.
pub fn parse_json_arg(arg: &str) -> Result<Bson, QueryError> {
    parse_json(&read_arg_text(arg)?)
}

/// Read the record source: the file when given, otherwise `fallback` (stdin).
///
/// # Errors
/// I/O failures.
pub fn read_input(input: Option<&Path>, mut fallback: impl Read) -> Result<String, QueryError> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            fallback.read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Records from a JSON array, or from NDJSON (one record per non-blank line).
///
/// # Errors
/// `QueryError::Json` for a malformed array, `QueryError::Config` naming the bad NDJSON line.
pub fn parse_records(text: &str) -> Result<Vec<Bson>, QueryError> {
    if text.trim_start().starts_with('[') {
        return Ok(match parse_json(text)? {
            Bson::Array(items) => items,
            other => vec![other],
        });
    }
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let rec = parse_json(line).map_err(|e| QueryError::Config(format!("line {}: {e}", i + 1)))?;
        out.push(rec);
    }
    Ok(out)
}
