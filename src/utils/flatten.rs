use bson::{Bson, Document};

/// Flattens nested mappings and sequences into a single mapping keyed by dotted paths.
///
/// Sequence positions become `key.0` (or `key[0]` when `brackets` is set). Only leaves
/// are emitted, so empty mappings and sequences disappear.
#[must_use]
pub fn flatten(val: &Bson, brackets: bool) -> Document {
    let mut out = Document::new();
    match val {
        Bson::Document(doc) => {
            for (k, v) in doc {
                flatten_into(v, k.as_str(), brackets, &mut out);
            }
        }
        Bson::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(v, &i.to_string(), brackets, &mut out);
            }
        }
        _ => {}
    }
    out
}

fn flatten_into(val: &Bson, key: &str, brackets: bool, out: &mut Document) {
    match val {
        Bson::Document(doc) => {
            for (k, v) in doc {
                flatten_into(v, &format!("{key}.{k}"), brackets, out);
            }
        }
        Bson::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                let child = if brackets { format!("{key}[{i}]") } else { format!("{key}.{i}") };
                flatten_into(v, &child, brackets, out);
            }
        }
        leaf => {
            out.insert(key.to_string(), leaf.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{bson, doc};

    #[test]
    fn flattens_with_dot_indices() {
        let v = bson!({"a": {"b": 1, "c": [10, {"d": true}]}, "e": {}});
        assert_eq!(flatten(&v, false), doc! {"a.b": 1, "a.c.0": 10, "a.c.1.d": true});
    }

    #[test]
    fn flattens_with_bracket_indices() {
        let v = bson!({"tags": ["x", "y"]});
        assert_eq!(flatten(&v, true), doc! {"tags[0]": "x", "tags[1]": "y"});
    }

    #[test]
    fn scalars_flatten_to_nothing() {
        assert!(flatten(&Bson::Int32(1), false).is_empty());
    }
}
