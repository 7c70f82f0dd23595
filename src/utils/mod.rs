//! Utility modules: value helpers, flattening, JSON conversion, numeric coercion, dev logging.
pub mod devlog;
pub mod flatten;
pub mod json;
pub mod num;
pub mod values;

pub use flatten::flatten;
pub use json::{bson_to_json, json_to_bson, parse_json};
pub use values::{deep_equal, difference, intersection, is_na, stringify, type_of};
