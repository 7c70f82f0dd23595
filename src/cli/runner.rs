use bson::Bson;
use std::io::{Read, Write};

use super::command::Command;
use super::util::{parse_json_arg, parse_records, read_input};
use crate::engine::QueryEngine;
use crate::errors::QueryError;
use crate::utils::{bson_to_json, flatten};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// One JSON value per line.
    Json,
    /// Bare values (`3`, `true`) where the command has a scalar result.
    Plain,
}

/// Run `cmd` with plain output.
///
/// # Errors
/// Input, parse or query errors.
pub fn run(engine: &QueryEngine, cmd: Command, stdin: impl Read, out: &mut impl Write) -> Result<(), QueryError> {
    run_with_format(engine, cmd, OutputMode::Plain, stdin, out)
}

/// # Errors
/// Input, parse or query errors.
pub fn run_with_format(
    engine: &QueryEngine,
    cmd: Command,
    mode: OutputMode,
    stdin: impl Read,
    out: &mut impl Write,
) -> Result<(), QueryError> {
    match cmd {
        Command::Filter { query, input, count } => {
            let query = parse_json_arg(&query)?;
            let records = parse_records(&read_input(input.as_deref(), stdin)?)?;
            let matched = engine.query(&records, &query)?;
            log::info!("filter: {} of {} record(s) matched", matched.len(), records.len());
            if count {
                match mode {
                    OutputMode::Json => writeln!(out, "{}", serde_json::json!({"count": matched.len()}))?,
                    OutputMode::Plain => writeln!(out, "{}", matched.len())?,
                }
                return Ok(());
            }
            for rec in matched {
                write_json_line(out, rec)?;
            }
            Ok(())
        }
        Command::Check { query, record } => {
            let query = parse_json_arg(&query)?;
            let record = parse_json_arg(&record)?;
            let ok = engine.satisfies(&record, &query)?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({"matches": ok}))?,
                OutputMode::Plain => writeln!(out, "{ok}")?,
            }
            Ok(())
        }
        Command::Flatten { input, brackets } => {
            let records = parse_records(&read_input(input.as_deref(), stdin)?)?;
            for rec in &records {
                write_json_line(out, &Bson::Document(flatten(rec, brackets)))?;
            }
            Ok(())
        }
    }
}

fn write_json_line(out: &mut impl Write, value: &Bson) -> Result<(), QueryError> {
    let line = serde_json::to_string(&bson_to_json(value))?;
    writeln!(out, "{line}")?;
    Ok(())
}
