use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};

use super::callback::CallbackRegistry;
use super::types::{
    Clause, CompareOp, CompiledQuery, Conditions, Constraint, FieldPath, GroupMember, Key,
    LogicOp, Operand, Operator, PathGroup, SizeOperand,
};
use crate::errors::QueryError;
use crate::path::{as_index, segments};
use crate::utils::values::stringify;

/// Compile a Query Document. Every key is classified exactly once here; unknown operators
/// and unresolvable callbacks fail now, wherever they are nested.
///
/// # Errors
/// `UnsupportedOperator` or `InvalidCallback`.
pub fn compile(query: &Bson, callbacks: &CallbackRegistry) -> Result<CompiledQuery, QueryError> {
    let root = Compiler { callbacks }.document(query)?;
    Ok(CompiledQuery { root })
}

/// Classify a Query Document key.
///
/// # Errors
/// `UnsupportedOperator` for a `$` key that names no operator.
pub fn classify(key: &str) -> Result<Key, QueryError> {
    if key.starts_with('$') {
        return Operator::from_name(key)
            .map(Key::Operator)
            .ok_or_else(|| QueryError::UnsupportedOperator(key.to_string()));
    }
    Ok(Key::Path(segments(key)))
}

/// Pre-process a comparator operand.
///
/// # Errors
/// `UnsupportedOperator` for unknown operators inside a `$size` mapping.
pub fn compile_operand(op: CompareOp, value: &Bson) -> Result<Operand, QueryError> {
    Ok(match op {
        CompareOp::Regex => Operand::Pattern(compile_regex(value)),
        CompareOp::Size => Operand::Size(compile_size(value)?),
        _ => Operand::Value(value.clone()),
    })
}

fn compile_size(value: &Bson) -> Result<SizeOperand, QueryError> {
    let Bson::Document(doc) = value else {
        return Ok(SizeOperand::Exact(value.clone()));
    };
    let mut checks = Vec::with_capacity(doc.len());
    let mut satisfiable = true;
    for (k, v) in doc {
        match classify(k.as_str())? {
            Key::Operator(Operator::Compare(op)) => checks.push((op, compile_operand(op, v)?)),
            _ => satisfiable = false,
        }
    }
    Ok(if satisfiable { SizeOperand::Checks(checks) } else { SizeOperand::Unsatisfiable })
}

fn compile_regex(value: &Bson) -> Option<Regex> {
    let (pattern, flags) = match value {
        Bson::RegularExpression(_) => {
            // Rendered as `/pattern/options`
            let shown = value.to_string();
            let body = shown.strip_prefix('/').unwrap_or(&shown);
            match body.rsplit_once('/') {
                Some((p, o)) => (p.to_string(), o.to_string()),
                None => (body.to_string(), String::new()),
            }
        }
        other => (stringify(other), String::new()),
    };
    let mut builder = RegexBuilder::new(&pattern);
    builder
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'));
    match builder.build() {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("invalid $regex pattern {pattern:?}: {e}");
            None
        }
    }
}

struct Compiler<'a> {
    callbacks: &'a CallbackRegistry,
}

impl Compiler<'_> {
    // Query-document position: mapping, sequence (implicit $or) or malformed scalar.
    fn document(&self, value: &Bson) -> Result<Constraint, QueryError> {
        Ok(match value {
            Bson::Document(doc) => Constraint::Doc(self.conditions(doc)?),
            Bson::Array(items) => {
                Constraint::Any(items.iter().map(|v| self.document(v)).collect::<Result<_, _>>()?)
            }
            _ => Constraint::Never,
        })
    }

    // Field-value position: a mapping is a nested query, anything else is equality.
    fn condition(&self, value: &Bson) -> Result<Constraint, QueryError> {
        Ok(match value {
            Bson::Document(doc) => Constraint::Doc(self.conditions(doc)?),
            other => Constraint::Literal(other.clone()),
        })
    }

    fn conditions(&self, doc: &Document) -> Result<Conditions, QueryError> {
        let mut out = Conditions::default();
        for (key, value) in doc {
            let key = key.as_str();
            match classify(key)? {
                Key::Operator(op) => out.clauses.push(self.operator(key, op, value)?),
                Key::Path(segs) => {
                    let constraint = self.condition(value)?;
                    let path = FieldPath { raw: key.to_string(), segments: segs };
                    push_path(&mut out, path, constraint);
                }
            }
        }
        Ok(out)
    }

    fn operator(&self, key: &str, op: Operator, value: &Bson) -> Result<Clause, QueryError> {
        Ok(match op {
            Operator::Logic(op) => Clause::Logic { op, operands: self.operands(op, value)? },
            Operator::Compare(op) => Clause::Compare { op, operand: compile_operand(op, value)? },
            Operator::EleMatch => Clause::EleMatch(Box::new(self.condition(value)?)),
            Operator::Cb => Clause::Callback(self.callbacks.resolve(key, value)?),
            Operator::Where => Clause::Where(self.callbacks.resolve(key, value)?),
        })
    }

    // A mapping operand is split into one single-key query per entry, except under
    // `$not`, which negates the mapping as a whole.
    fn operands(&self, op: LogicOp, value: &Bson) -> Result<Vec<Constraint>, QueryError> {
        match value {
            Bson::Array(items) => items.iter().map(|v| self.document(v)).collect(),
            Bson::Document(doc) if op != LogicOp::Not => doc
                .iter()
                .map(|(k, v)| {
                    let mut single = Document::new();
                    single.insert(k.clone(), v.clone());
                    Ok(Constraint::Doc(self.conditions(&single)?))
                })
                .collect(),
            other => Ok(vec![self.document(other)?]),
        }
    }
}

// Dot-qualified keys group by root, except when the next segment indexes a sequence.
fn push_path(out: &mut Conditions, path: FieldPath, constraint: Constraint) {
    let grouped = path.segments.len() > 1 && as_index(&path.segments[1]).is_none();
    if !grouped {
        out.clauses.push(Clause::Path { path, constraint });
        return;
    }
    let root = path.segments[0].clone();
    let rest = path.segments[1..].to_vec();
    let member = GroupMember { path, rest, constraint };
    match out.groups.iter_mut().find(|g| g.root == root) {
        Some(group) => group.members.push(member),
        None => out.groups.push(PathGroup { root, members: vec![member] }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;

    fn compile_doc(q: Bson) -> Result<CompiledQuery, QueryError> {
        compile(&q, &CallbackRegistry::new())
    }

    #[test]
    fn groups_dotted_keys_by_root() {
        let q = compile_doc(bson!({"a.b": 1, "a.c": 2, "a.0.d": 3, "x": 4})).unwrap();
        let Constraint::Doc(conds) = q.constraint() else { panic!("expected mapping") };
        assert_eq!(conds.groups.len(), 1);
        assert_eq!(conds.groups[0].root, "a");
        assert_eq!(conds.groups[0].members.len(), 2);
        assert_eq!(conds.clauses.len(), 2);
    }

    #[test]
    fn unknown_operators_fail_at_any_depth() {
        for q in [
            bson!({"x": {"$nope": 1}}),
            bson!({"$and": [{"x": {"$bogus": 1}}]}),
            bson!({"arr": {"$eleMatch": {"$weird": 2}}}),
            bson!({"arr": {"$size": {"$huh": 2}}}),
            bson!([{"a": 1}, {"b": {"$zzz": 0}}]),
        ] {
            assert!(matches!(compile_doc(q), Err(QueryError::UnsupportedOperator(_))));
        }
    }

    #[test]
    fn where_is_not_a_logic_operator() {
        assert_eq!(classify("$where").unwrap(), Key::Operator(Operator::Where));
        assert_eq!(classify("$xor").unwrap(), Key::Operator(Operator::Logic(LogicOp::Xor)));
        assert_eq!(classify("a[1].b").unwrap(), Key::Path(vec!["a".into(), "1".into(), "b".into()]));
    }

    #[test]
    fn scalar_documents_compile_to_never() {
        assert!(matches!(compile_doc(Bson::Int32(3)).unwrap().constraint(), Constraint::Never));
    }

    #[test]
    fn size_operand_forms() {
        assert!(matches!(compile_size(&Bson::Int32(2)).unwrap(), SizeOperand::Exact(_)));
        assert!(matches!(compile_size(&bson!({"$gt": 1})).unwrap(), SizeOperand::Checks(c) if c.len() == 1));
        assert!(matches!(compile_size(&bson!({"len": 1})).unwrap(), SizeOperand::Unsatisfiable));
    }

    #[test]
    fn invalid_regex_compiles_to_none() {
        assert!(compile_regex(&Bson::String("(".into())).is_none());
        assert!(compile_regex(&Bson::String("^a.c$".into())).is_some());
    }

    #[test]
    fn callbacks_must_be_registered() {
        let mut reg = CallbackRegistry::new();
        reg.register("ok", |_| Ok(true));
        assert!(compile(&bson!({"a": {"$cb": "ok"}}), &reg).is_ok());
        assert!(matches!(
            compile(&bson!({"$where": "missing"}), &reg),
            Err(QueryError::InvalidCallback { .. })
        ));
    }
}
