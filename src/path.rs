//! Dot/bracket path resolution through mixed mapping/sequence trees.
//!
//! Resolution never fails: absence is `None`. A numeric segment applied to a sequence
//! indexes it; any other segment applied to a sequence is broadcast to every element
//! and the defined results are flattened one level.

use bson::{Bson, Document};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Largest sequence index [`set`] will write; gaps up to it are padded with nulls.
pub const MAX_SET_INDEX: usize = 4096;

static BRACKET_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("bracket index pattern is valid"));

/// Rewrites bracket indices to dot form: `a[2].b` becomes `a.2.b`.
#[must_use]
pub fn normalize(path: &str) -> Cow<'_, str> {
    BRACKET_INDEX.replace_all(path, ".$1")
}

/// Splits a path into normalized segments.
#[must_use]
pub fn segments(path: &str) -> Vec<String> {
    normalize(path).split('.').map(str::to_string).collect()
}

/// Parses a segment as a sequence index (non-negative integer literal).
#[must_use]
pub fn as_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Resolves `path` against `root`.
#[must_use]
pub fn get<'a>(root: &'a Bson, path: &str) -> Option<Cow<'a, Bson>> {
    if path.is_empty() {
        return None;
    }
    get_segments(root, &segments(path))
}

/// Resolves pre-split segments against `value`.
#[must_use]
pub fn get_segments<'a, S: AsRef<str>>(value: &'a Bson, segs: &[S]) -> Option<Cow<'a, Bson>> {
    let Some((head, rest)) = segs.split_first() else {
        return Some(Cow::Borrowed(value));
    };
    let head = head.as_ref();
    match value {
        Bson::Array(items) => {
            if let Some(i) = as_index(head) {
                return items.get(i).and_then(|v| get_segments(v, rest));
            }
            broadcast(items, segs).map(Cow::Owned)
        }
        Bson::Document(doc) => doc.get(head).and_then(|v| get_segments(v, rest)),
        _ => None,
    }
}

/// Resolves `segs` independently against every element of `items`, drops absent
/// results and flattens one level. `None` when every element resolves to nothing.
#[must_use]
pub fn broadcast<S: AsRef<str>>(items: &[Bson], segs: &[S]) -> Option<Bson> {
    let mut out = Vec::new();
    let mut any = false;
    for item in items {
        let Some(v) = get_segments(item, segs) else { continue };
        any = true;
        match v.into_owned() {
            Bson::Array(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    any.then_some(Bson::Array(out))
}

/// Writes `value` at `path`, creating intermediate mappings (or sequences when the next
/// segment is an index). Returns `false` when an existing scalar blocks the path or an
/// index exceeds [`MAX_SET_INDEX`]; an oversized index leaves `root` untouched.
pub fn set(root: &mut Bson, path: &str, value: Bson) -> bool {
    let segs = segments(path);
    if path.is_empty() || segs.iter().any(|s| oversized_index(s)) {
        return false;
    }
    set_segments(root, &segs, value)
}

// Digit segments past the cap, including ones that overflow `usize`.
fn oversized_index(segment: &str) -> bool {
    !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && as_index(segment).is_none_or(|i| i > MAX_SET_INDEX)
}

fn set_segments(cur: &mut Bson, segs: &[String], value: Bson) -> bool {
    let Some((head, rest)) = segs.split_first() else { return false };
    let next_is_index = rest.first().is_some_and(|s| as_index(s).is_some());
    let fresh = || if next_is_index { Bson::Array(Vec::new()) } else { Bson::Document(Document::new()) };
    match cur {
        Bson::Document(doc) => {
            if rest.is_empty() {
                doc.insert(head.clone(), value);
                return true;
            }
            if !doc.contains_key(head.as_str()) {
                doc.insert(head.clone(), fresh());
            }
            match doc.get_mut(head.as_str()) {
                Some(child) => set_segments(child, rest, value),
                None => false,
            }
        }
        Bson::Array(items) => {
            let Some(i) = as_index(head) else { return false };
            if items.len() <= i {
                items.resize(i + 1, Bson::Null);
            }
            if rest.is_empty() {
                items[i] = value;
                return true;
            }
            if matches!(items[i], Bson::Null) {
                items[i] = fresh();
            }
            set_segments(&mut items[i], rest, value)
        }
        _ => false,
    }
}

/// Resolves a field path against a record. Overrides [`PathResolver`] for callers with
/// their own schema or indexing layer.
pub trait FieldGetter: Send + Sync {
    fn get<'a>(&self, record: &'a Bson, path: &str) -> Option<Cow<'a, Bson>>;
}

/// Default getter backed by [`get`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl FieldGetter for PathResolver {
    fn get<'a>(&self, record: &'a Bson, path: &str) -> Option<Cow<'a, Bson>> {
        get(record, path)
    }
}

impl<F> FieldGetter for F
where
    F: Fn(&Bson, &str) -> Option<Bson> + Send + Sync,
{
    fn get<'a>(&self, record: &'a Bson, path: &str) -> Option<Cow<'a, Bson>> {
        self(record, path).map(Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;

    #[test]
    fn normalizes_brackets() {
        assert_eq!(normalize("a[2].b[10]"), "a.2.b.10");
        assert_eq!(segments("x.y"), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn index_segments_are_digit_literals() {
        assert_eq!(as_index("3"), Some(3));
        assert_eq!(as_index("-1"), None);
        assert_eq!(as_index("1a"), None);
        assert_eq!(as_index(""), None);
    }

    #[test]
    fn set_creates_intermediate_containers() {
        let mut root = bson!({});
        assert!(set(&mut root, "a.list[1].b", Bson::Int32(7)));
        assert_eq!(root, bson!({"a": {"list": [null, {"b": 7}]}}));
        assert!(!set(&mut root, "a.list.1.b.c", Bson::Int32(1)));
    }

    #[test]
    fn set_rejects_oversized_indices() {
        let mut root = bson!({});
        assert!(!set(&mut root, "a.99999999999999", Bson::Int32(1)));
        assert!(!set(&mut root, "a[99999999999999999999999]", Bson::Int32(1)));
        assert!(!set(&mut root, &format!("a.{}", MAX_SET_INDEX + 1), Bson::Int32(1)));
        assert_eq!(root, bson!({}));
        assert!(set(&mut root, &format!("a.{MAX_SET_INDEX}"), Bson::Int32(1)));
        assert_eq!(root.as_document().unwrap().get_array("a").unwrap().len(), MAX_SET_INDEX + 1);
    }

    #[test]
    fn deep_paths_resolve() {
        let segs: Vec<String> = (0..100).map(|_| "n".to_string()).collect();
        let mut root = bson!({});
        assert!(set(&mut root, &segs.join("."), Bson::Int32(7)));
        assert_eq!(get(&root, &segs.join(".")).as_deref(), Some(&Bson::Int32(7)));
    }
}
