use std::path::PathBuf;

/// Programmatic form of the CLI subcommands. Query and record arguments are inline JSON
/// or `@path` references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the records of `input` (stdin when `None`) that match `query`.
    Filter { query: String, input: Option<PathBuf>, count: bool },
    /// Print whether a single record matches `query`.
    Check { query: String, record: String },
    /// Print every record flattened to dotted keys.
    Flatten { input: Option<PathBuf>, brackets: bool },
}
