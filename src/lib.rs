//! In-memory MongoDB-style query evaluation over loosely structured records.
//!
//! Records are [`bson::Bson`] values. A query document such as
//! `{"items.price": {"$gt": 10}, "tags": {"$eleMatch": {"$startsWith": "a"}}}` is compiled
//! once into a [`Predicate`] and then applied to any number of records.
//!
//! ```
//! use arrayquery::QueryEngine;
//! use bson::bson;
//!
//! let engine = QueryEngine::new();
//! let records = vec![bson!({"n": 1}), bson!({"n": 5})];
//! let hits = engine.query(&records, &bson!({"n": {"$gte": 2}})).unwrap();
//! assert_eq!(hits.len(), 1);
//! ```

pub mod cli;
pub mod config;
pub mod dates;
pub mod engine;
pub mod errors;
pub mod logger;
pub mod path;
pub mod query;
pub mod utils;

pub use config::EngineConfig;
pub use dates::{DateComparer, DateParser};
pub use engine::{Predicate, QueryEngine, QueryEngineBuilder, parse_query_json};
pub use errors::QueryError;
pub use path::{FieldGetter, PathResolver};
pub use query::{CallbackContext, CallbackResult, Comparators, CompiledQuery};
