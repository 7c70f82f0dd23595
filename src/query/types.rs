use bson::Bson;
use regex::Regex;

use super::callback::Callback;

/// Logical combinators. They compose constraints and never read record fields directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Not,
    Nor,
    Xor,
}

/// Named comparators of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Contains,
    ContainsAll,
    ContainsAny,
    Size,
    Type,
    Exists,
    Regex,
    Mod,
    Between,
    StartsWith,
    EndsWith,
    Includes,
    Length,
}

impl CompareOp {
    pub const ALL: [Self; 21] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::Nin,
        Self::Contains,
        Self::ContainsAll,
        Self::ContainsAny,
        Self::Size,
        Self::Type,
        Self::Exists,
        Self::Regex,
        Self::Mod,
        Self::Between,
        Self::StartsWith,
        Self::EndsWith,
        Self::Includes,
        Self::Length,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Contains => "$contains",
            Self::ContainsAll => "$containsAll",
            Self::ContainsAny => "$containsAny",
            Self::Size => "$size",
            Self::Type => "$type",
            Self::Exists => "$exists",
            Self::Regex => "$regex",
            Self::Mod => "$mod",
            Self::Between => "$between",
            Self::StartsWith => "$startsWith",
            Self::EndsWith => "$endsWith",
            Self::Includes => "$includes",
            Self::Length => "$length",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Operators that apply to a broadcast sequence as a whole rather than per element.
    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(self, Self::Size | Self::Contains | Self::ContainsAll | Self::ContainsAny | Self::In)
    }

    /// Operators that, given a sequence as the actual value, hold if any element satisfies them.
    #[must_use]
    pub const fn fans_out(self) -> bool {
        matches!(
            self,
            Self::Gt
                | Self::Gte
                | Self::Lt
                | Self::Lte
                | Self::Between
                | Self::Mod
                | Self::Regex
                | Self::StartsWith
                | Self::EndsWith
                | Self::Includes
        )
    }
}

/// Every reserved `$` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Logic(LogicOp),
    Compare(CompareOp),
    EleMatch,
    Cb,
    Where,
}

impl Operator {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let logic = match name {
            "$and" => Some(LogicOp::And),
            "$or" => Some(LogicOp::Or),
            "$not" => Some(LogicOp::Not),
            "$nor" => Some(LogicOp::Nor),
            "$xor" => Some(LogicOp::Xor),
            _ => None,
        };
        if let Some(op) = logic {
            return Some(Self::Logic(op));
        }
        match name {
            "$eleMatch" => Some(Self::EleMatch),
            "$cb" => Some(Self::Cb),
            "$where" => Some(Self::Where),
            _ => CompareOp::from_name(name).map(Self::Compare),
        }
    }

    #[must_use]
    pub fn is_supported(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

/// A Query Document key, classified once at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Operator(Operator),
    Path(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub raw: String,
    pub segments: Vec<String>,
}

/// Compiled form of a constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// A scalar where a query document was expected; never matches.
    Never,
    /// Implicit equality.
    Literal(Bson),
    /// A sequence in query-document position: implicit `$or`.
    Any(Vec<Constraint>),
    Doc(Conditions),
}

/// The keys of one mapping: dot-qualified paths grouped by root, plus direct clauses.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    pub groups: Vec<PathGroup>,
    pub clauses: Vec<Clause>,
}

impl Conditions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.clauses.is_empty()
    }

    pub(crate) fn has_aggregate(&self) -> bool {
        self.clauses.iter().any(Clause::is_aggregate)
    }

    pub(crate) fn size_clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|c| matches!(c, Clause::Compare { op: CompareOp::Size, .. }))
    }
}

/// Dot-qualified keys sharing a root segment. When the root resolves to a sequence, a
/// single element must satisfy every member.
#[derive(Debug, Clone)]
pub struct PathGroup {
    pub root: String,
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone)]
pub struct GroupMember {
    pub path: FieldPath,
    /// Segments after the root.
    pub rest: Vec<String>,
    pub constraint: Constraint,
}

#[derive(Debug, Clone)]
pub enum Clause {
    Logic { op: LogicOp, operands: Vec<Constraint> },
    Where(Callback),
    Compare { op: CompareOp, operand: Operand },
    EleMatch(Box<Constraint>),
    Callback(Callback),
    Path { path: FieldPath, constraint: Constraint },
}

impl Clause {
    pub(crate) fn is_aggregate(&self) -> bool {
        matches!(self, Self::Compare { op, .. } if op.is_aggregate())
    }
}

/// Comparator operand, pre-processed where the operator needs it.
#[derive(Debug, Clone)]
pub enum Operand {
    Value(Bson),
    /// `None` when the pattern failed to compile; such a `$regex` never matches.
    Pattern(Option<Regex>),
    Size(SizeOperand),
}

#[derive(Debug, Clone)]
pub enum SizeOperand {
    Exact(Bson),
    Checks(Vec<(CompareOp, Operand)>),
    /// Mapping operand carrying keys that are not comparators.
    Unsatisfiable,
}

/// Which direct clauses a pass over [`Conditions`] evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    All,
    SkipAggregate,
    OnlyAggregate,
    SkipSize,
}

impl FilterMode {
    pub(crate) fn admits(self, clause: &Clause) -> bool {
        match self {
            Self::All => true,
            Self::SkipAggregate => !clause.is_aggregate(),
            Self::OnlyAggregate => clause.is_aggregate(),
            Self::SkipSize => !matches!(clause, Clause::Compare { op: CompareOp::Size, .. }),
        }
    }

    /// Path groups belong to the existential pass only.
    pub(crate) const fn admits_groups(self) -> bool {
        !matches!(self, Self::OnlyAggregate)
    }
}

/// An immutable, compiled Query Document.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub(crate) root: Constraint,
}

impl CompiledQuery {
    #[must_use]
    pub fn constraint(&self) -> &Constraint {
        &self.root
    }
}
