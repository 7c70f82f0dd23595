// Callback table for $cb / $where
pub mod callback;

// Submodules for separation of concerns
mod compare;
mod element;
mod eval;
mod matcher;
mod parse;
mod types;

// Public API re-exports
pub use callback::{
    Callback, CallbackContext, CallbackError, CallbackFn, CallbackRegistry, CallbackResult,
};
pub use compare::Comparators;
pub use element::evaluate as element_match;
pub use eval::eval_query;
pub use matcher::{Matcher, Scope};
pub use parse::{classify, compile, compile_operand};
pub use types::{
    Clause, CompareOp, CompiledQuery, Conditions, Constraint, FieldPath, FilterMode, GroupMember,
    Key, LogicOp, Operand, Operator, PathGroup, SizeOperand,
};
