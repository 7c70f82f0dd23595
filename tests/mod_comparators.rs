use arrayquery::query::{Comparators, CompareOp};
use arrayquery::{DateComparer, DateParser};
use bson::{Bson, bson};
use std::cmp::Ordering;
use std::sync::Arc;

fn check(name: &str, actual: Bson, operand: Bson) -> bool {
    Comparators::default().compare(name, Some(&actual), &operand).unwrap()
}

#[test]
fn equality_and_ordering() {
    assert!(check("$eq", bson!(1), bson!(1.0)));
    assert!(check("$ne", bson!("a"), bson!("b")));
    assert!(check("$eq", bson!({"x": [1, 2]}), bson!({"x": [1, 2]})));
    assert!(!check("$eq", bson!([1, 2]), bson!([2, 1])));
    assert!(check("$gte", bson!(5), bson!(5)));
    assert!(check("$lte", bson!("abc"), bson!("abd")));
    assert!(!check("$gt", bson!("10"), bson!(9)));
}

#[test]
fn date_strings_compare_chronologically() {
    assert!(check("$eq", bson!("2023-01-15"), bson!("01/15/2023")));
    assert!(check("$gt", bson!("2023-02-01"), bson!("15-01-2023")));
    assert!(check("$lt", bson!("2023-01-15T10:00:00Z"), bson!("2023-01-15T12:00:00+01:00")));
}

#[test]
fn membership_operators() {
    assert!(check("$in", bson!("b"), bson!(["a", "b"])));
    assert!(!check("$in", bson!("b"), bson!("b")));
    assert!(check("$nin", bson!("z"), bson!(["a", "b"])));
    assert!(check("$contains", bson!(["x", "y"]), bson!("y")));
    assert!(!check("$contains", bson!("xy"), bson!("y")));
    assert!(check("$containsAll", bson!([1, 2, 3]), bson!([3, 1])));
    assert!(!check("$containsAll", bson!([1, 2]), bson!([1, 4])));
    assert!(check("$containsAny", bson!([1, 2]), bson!([9, 2])));
    assert!(!check("$containsAny", bson!([1, 2]), bson!([])));
}

#[test]
fn size_accepts_counts_and_nested_comparators() {
    assert!(check("$size", bson!([1, 2]), bson!(2)));
    assert!(check("$size", bson!([1, 2]), bson!({"$gt": 1, "$lt": 3})));
    assert!(!check("$size", bson!([1, 2]), bson!({"$gt": 2})));
    assert!(!check("$size", bson!("ab"), bson!(2)));
    assert!(!check("$size", bson!([1]), bson!("1")));
}

#[test]
fn type_and_existence() {
    assert!(check("$type", bson!([1]), bson!("array")));
    assert!(check("$type", bson!({"a": 1}), bson!("object")));
    assert!(check("$type", bson!(1), bson!("number")));
    assert!(check("$type", bson!(1), bson!("int")));
    assert!(check("$type", Bson::Null, bson!("null")));
    assert!(check("$exists", bson!(0), bson!(true)));
    let c = Comparators::default();
    assert!(c.compare("$exists", None, &bson!(false)).unwrap());
    assert!(c.compare("$type", None, &bson!("undefined")).unwrap());
}

#[test]
fn string_level_checks() {
    assert!(check("$regex", bson!("Hello"), bson!("^H.l")));
    assert!(check("$regex", bson!(1234), bson!("^12")));
    assert!(!check("$regex", bson!("abc"), bson!("(")));
    assert!(check("$startsWith", bson!("prefix-body"), bson!("prefix")));
    assert!(check("$endsWith", bson!("file.rs"), bson!(".rs")));
    assert!(check("$includes", bson!("haystack"), bson!("st")));
    assert!(check("$length", bson!("héllo"), bson!(5)));
}

#[test]
fn arithmetic_and_ranges() {
    assert!(check("$mod", bson!(10), bson!([3, 1])));
    assert!(!check("$mod", bson!(10), bson!([0, 0])));
    assert!(!check("$mod", bson!(10), bson!([3])));
    assert!(check("$between", bson!(5), bson!([1, 5])));
    assert!(!check("$between", bson!(6), bson!([1, 5])));
    assert!(check("$between", bson!("2023-01-15"), bson!(["2023-01-01", "2023-01-31"])));
}

#[test]
fn ordering_and_string_operators_fan_out_over_sequences() {
    assert!(check("$gt", bson!([1, 7]), bson!(5)));
    assert!(!check("$gt", bson!([1, 2]), bson!(5)));
    assert!(check("$startsWith", bson!(["ab", "cd"]), bson!("c")));
    assert!(CompareOp::Gt.fans_out());
    assert!(!CompareOp::Eq.fans_out());
    assert!(CompareOp::Size.is_aggregate());
}

#[test]
fn mismatched_types_are_false_not_errors() {
    for op in CompareOp::ALL {
        let got = Comparators::default().compare(op.name(), Some(&bson!({"k": 1})), &bson!(null));
        assert!(got.is_ok(), "{} failed", op.name());
    }
    assert!(Comparators::default().compare("$bogus", None, &bson!(1)).is_err());
}

struct NoDates;

impl DateComparer for NoDates {
    fn compare(&self, _: &Bson, _: &Bson) -> Option<Ordering> {
        None
    }
}

#[test]
fn the_date_collaborator_is_swappable() {
    let lexical = Comparators::new(Arc::new(NoDates));
    let a = bson!("2023-01-15");
    let b = bson!("01/15/2023");
    assert!(!lexical.eq(&a, &b));
    assert!(Comparators::new(Arc::new(DateParser::default())).eq(&a, &b));
}
