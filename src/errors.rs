use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("{operator} requires a registered callback: {reason}")]
    InvalidCallback { operator: String, reason: String },

    #[error("Error in $cb execution for field '{field}': {message}")]
    CallbackExecution { field: String, message: String },

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for QueryError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl QueryError {
    pub(crate) fn invalid_callback(operator: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCallback { operator: operator.to_string(), reason: reason.into() }
    }
}
