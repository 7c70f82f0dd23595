use bson::Bson;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::dates::{DateComparer, DateParser};
use crate::errors::QueryError;
use crate::path::FieldGetter;
use crate::query::{
    CallbackContext, CallbackRegistry, CallbackResult, Comparators, CompiledQuery, Constraint,
    compile, eval_query,
};

/// The query facade. Holds one comparator registry and one callback table; immutable
/// once built, so a single engine can serve any number of threads.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    comparators: Comparators,
    callbacks: CallbackRegistry,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl QueryEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> QueryEngineBuilder {
        QueryEngineBuilder::default()
    }

    /// Engine with the date formats of `config`.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::builder().config(config).build()
    }

    #[must_use]
    pub fn comparators(&self) -> &Comparators {
        &self.comparators
    }

    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Compile a Query Document without binding it to a predicate.
    ///
    /// # Errors
    /// `UnsupportedOperator` or `InvalidCallback`.
    pub fn compile(&self, query: &Bson) -> Result<CompiledQuery, QueryError> {
        let compiled = compile(query, &self.callbacks)?;
        log::debug!("compiled query: {}", describe(compiled.constraint()));
        Ok(compiled)
    }

    /// Compile `query` into a reusable predicate.
    ///
    /// # Errors
    /// `UnsupportedOperator` or `InvalidCallback`.
    pub fn build(&self, query: &Bson) -> Result<Predicate, QueryError> {
        Ok(Predicate {
            query: Arc::new(self.compile(query)?),
            comparators: self.comparators.clone(),
            getter: None,
        })
    }

    /// Like [`build`](Self::build), resolving record-level paths through `getter`.
    ///
    /// # Errors
    /// `UnsupportedOperator` or `InvalidCallback`.
    pub fn build_with_getter(&self, query: &Bson, getter: Arc<dyn FieldGetter>) -> Result<Predicate, QueryError> {
        let mut pred = self.build(query)?;
        pred.getter = Some(getter);
        Ok(pred)
    }

    /// Single-record check.
    ///
    /// # Errors
    /// Compile errors, or `CallbackExecution` from a failing callback.
    pub fn satisfies(&self, record: &Bson, query: &Bson) -> Result<bool, QueryError> {
        let compiled = self.compile(query)?;
        eval_query(record, &compiled, &self.comparators, None)
    }

    /// # Errors
    /// Compile errors, or `CallbackExecution` from a failing callback.
    pub fn satisfies_with_getter(
        &self,
        record: &Bson,
        query: &Bson,
        getter: &dyn FieldGetter,
    ) -> Result<bool, QueryError> {
        let compiled = self.compile(query)?;
        eval_query(record, &compiled, &self.comparators, Some(getter))
    }

    /// Stable-order subsequence of `records` satisfying `query`.
    ///
    /// # Errors
    /// Compile errors, or `CallbackExecution` from a failing callback.
    pub fn query<'r>(&self, records: &'r [Bson], query: &Bson) -> Result<Vec<&'r Bson>, QueryError> {
        self.build(query)?.filter(records)
    }

    /// # Errors
    /// Compile errors, or `CallbackExecution` from a failing callback.
    pub fn query_with_getter<'r>(
        &self,
        records: &'r [Bson],
        query: &Bson,
        getter: Arc<dyn FieldGetter>,
    ) -> Result<Vec<&'r Bson>, QueryError> {
        self.build_with_getter(query, getter)?.filter(records)
    }

    /// Filter a value that should be a sequence of records. Anything else yields nothing.
    ///
    /// # Errors
    /// Compile errors, or `CallbackExecution` from a failing callback.
    pub fn query_value<'r>(&self, records: &'r Bson, query: &Bson) -> Result<Vec<&'r Bson>, QueryError> {
        match records {
            Bson::Array(items) => self.query(items, query),
            _ => Ok(Vec::new()),
        }
    }
}

/// Builder for [`QueryEngine`].
#[derive(Default)]
pub struct QueryEngineBuilder {
    date_formats: Option<Vec<String>>,
    dates: Option<Arc<dyn DateComparer>>,
    callbacks: CallbackRegistry,
}

impl fmt::Debug for QueryEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngineBuilder")
            .field("date_formats", &self.date_formats)
            .field("custom_dates", &self.dates.is_some())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl QueryEngineBuilder {
    /// Accepted date formats for the default [`DateParser`].
    #[must_use]
    pub fn date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = Some(formats);
        self
    }

    /// Replace the date collaborator entirely. Takes precedence over `date_formats`.
    #[must_use]
    pub fn date_comparer(mut self, dates: Arc<dyn DateComparer>) -> Self {
        self.dates = Some(dates);
        self
    }

    #[must_use]
    pub fn config(self, config: &EngineConfig) -> Self {
        self.date_formats(config.date_formats.clone())
    }

    /// Register a callback usable as `{"$cb": name}` or `{"$where": name}`.
    #[must_use]
    pub fn callback<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&CallbackContext<'_>) -> CallbackResult + Send + Sync + 'static,
    {
        self.callbacks.register(name, func);
        self
    }

    #[must_use]
    pub fn build(self) -> QueryEngine {
        let dates: Arc<dyn DateComparer> = match (self.dates, self.date_formats) {
            (Some(dates), _) => dates,
            (None, Some(formats)) => Arc::new(DateParser::new(formats)),
            (None, None) => Arc::new(DateParser::default()),
        };
        QueryEngine { comparators: Comparators::new(dates), callbacks: self.callbacks }
    }
}

/// A compiled, reusable record predicate. Cheap to clone; `Send + Sync`.
#[derive(Clone)]
pub struct Predicate {
    query: Arc<CompiledQuery>,
    comparators: Comparators,
    getter: Option<Arc<dyn FieldGetter>>,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("query", &self.query)
            .field("getter", &self.getter.is_some())
            .finish()
    }
}

impl Predicate {
    #[must_use]
    pub fn compiled(&self) -> &CompiledQuery {
        &self.query
    }

    /// # Errors
    /// `CallbackExecution` from a failing callback.
    pub fn matches(&self, record: &Bson) -> Result<bool, QueryError> {
        eval_query(record, &self.query, &self.comparators, self.getter.as_deref())
    }

    /// Stable-order subsequence of `records` this predicate accepts.
    ///
    /// # Errors
    /// `CallbackExecution` from a failing callback.
    pub fn filter<'r>(&self, records: &'r [Bson]) -> Result<Vec<&'r Bson>, QueryError> {
        let bench_start = Instant::now();
        let mut out = Vec::new();
        for record in records {
            if self.matches(record)? {
                out.push(record);
            }
        }
        let dur_us = bench_start.elapsed().as_micros();
        // Emit a developer-benchmark log line for deterministic capture in tests
        crate::dev6!(
            "{{\"bench\":\"query\",\"op\":\"filter\",\"input\":{},\"matched\":{},\"duration_us\":{}}}",
            records.len(),
            out.len(),
            dur_us
        );
        Ok(out)
    }
}

/// Parse JSON text into a Query Document.
///
/// # Errors
/// `QueryError::Json` on malformed text.
pub fn parse_query_json(text: &str) -> Result<Bson, QueryError> {
    crate::utils::json::parse_json(text)
}

fn describe(c: &Constraint) -> String {
    match c {
        Constraint::Never => "never".to_string(),
        Constraint::Literal(_) => "literal".to_string(),
        Constraint::Any(alts) => format!("any-of {}", alts.len()),
        Constraint::Doc(conds) => {
            format!("{} group(s), {} clause(s)", conds.groups.len(), conds.clauses.len())
        }
    }
}
