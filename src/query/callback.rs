//! Named callbacks for `$cb` and `$where`.
//!
//! Callbacks are registered on the engine under a name and referenced from a Query
//! Document by that name, so query documents stay plain data. Resolution happens at
//! compile time; an unknown name never reaches evaluation.

use bson::Bson;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::compare::Comparators;
use crate::errors::QueryError;
use crate::path::{self, FieldGetter};

pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;
pub type CallbackResult = Result<bool, CallbackError>;
pub type CallbackFn = dyn Fn(&CallbackContext<'_>) -> CallbackResult + Send + Sync;

/// What a callback sees when it runs.
pub struct CallbackContext<'a> {
    record: &'a Bson,
    field: Option<&'a str>,
    value: Option<&'a Bson>,
    comparators: &'a Comparators,
    getter: Option<&'a dyn FieldGetter>,
}

impl<'a> CallbackContext<'a> {
    pub(crate) fn new(
        record: &'a Bson,
        field: Option<&'a str>,
        value: Option<&'a Bson>,
        comparators: &'a Comparators,
        getter: Option<&'a dyn FieldGetter>,
    ) -> Self {
        Self { record, field, value, comparators, getter }
    }

    /// The record under evaluation.
    #[must_use]
    pub fn record(&self) -> &'a Bson {
        self.record
    }

    /// Field path the callback is attached to; `None` for `$where` and record-level `$cb`.
    #[must_use]
    pub fn field(&self) -> Option<&'a str> {
        self.field
    }

    /// Value at the field (the record itself at record level).
    #[must_use]
    pub fn value(&self) -> Option<&'a Bson> {
        self.value
    }

    #[must_use]
    pub fn comparators(&self) -> &'a Comparators {
        self.comparators
    }

    /// Resolve `path` against the record through the active getter.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Cow<'a, Bson>> {
        match self.getter {
            Some(g) => g.get(self.record, path),
            None => path::get(self.record, path),
        }
    }
}

/// A resolved callback reference.
#[derive(Clone)]
pub struct Callback {
    name: String,
    func: Arc<CallbackFn>,
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Callback {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the callback. Any error it returns is wrapped with the field it ran for.
    pub(crate) fn invoke(&self, ctx: &CallbackContext<'_>, label: &str) -> Result<bool, QueryError> {
        (self.func)(ctx).map_err(|e| QueryError::CallbackExecution {
            field: ctx.field().unwrap_or(label).to_string(),
            message: e.to_string(),
        })
    }
}

/// Per-engine callback table.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    entries: HashMap<String, Arc<CallbackFn>>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("CallbackRegistry").field("names", &names).finish()
    }
}

impl CallbackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&CallbackContext<'_>) -> CallbackResult + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(func));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the operand of `operator` (`$cb` or `$where`) to a registered callback.
    ///
    /// # Errors
    /// `InvalidCallback` when the operand is not a string or names nothing registered.
    pub fn resolve(&self, operator: &str, operand: &Bson) -> Result<Callback, QueryError> {
        let Bson::String(name) = operand else {
            return Err(QueryError::invalid_callback(
                operator,
                format!("operand must be a callback name, got {}", crate::utils::type_of(Some(operand))),
            ));
        };
        let func = self
            .entries
            .get(name)
            .ok_or_else(|| QueryError::invalid_callback(operator, format!("'{name}' is not registered")))?;
        Ok(Callback { name: name.clone(), func: Arc::clone(func) })
    }
}
