use compgraph::kernel::joiners::{InnerJoiner, LeftJoiner, OuterJoiner, RightJoiner};
use compgraph::kernel::Joiner;
use compgraph::value::{Row, Value};

fn row(pairs: &[(&str, Value)]) -> Row {
    let mut r = Row::new();
    for (k, v) in pairs {
        r.set(*k, v.clone());
    }
    r
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn inner_join_is_a_cartesian_product_of_matched_groups() {
    let left = vec![row(&[("k", Value::from(1i64)), ("a", Value::from("x"))])];
    let right = vec![
        row(&[("k", Value::from(1i64)), ("b", Value::from("y1"))]),
        row(&[("k", Value::from(1i64)), ("b", Value::from("y2"))]),
    ];
    let out = InnerJoiner::new().join(&keys(&["k"]), left, right).unwrap();
    assert_eq!(out.len(), 2);
    for r in &out {
        assert_eq!(*r.get("k").unwrap(), Value::Int(1));
        assert_eq!(r.get("a").unwrap().as_str("a").unwrap(), "x");
    }
}

#[test]
fn inner_join_drops_an_unmatched_side_entirely() {
    let left = vec![row(&[("k", Value::from(1i64))])];
    let right: Vec<Row> = Vec::new();
    let out = InnerJoiner::new().join(&keys(&["k"]), left, right).unwrap();
    assert!(out.is_empty());
}

#[test]
fn outer_join_passes_through_unmatched_rows_on_either_side() {
    let left = vec![row(&[("k", Value::from(1i64)), ("a", Value::from("x"))])];
    let right: Vec<Row> = Vec::new();
    let out = OuterJoiner::new().join(&keys(&["k"]), left.clone(), right).unwrap();
    assert_eq!(out, left);

    let left: Vec<Row> = Vec::new();
    let right = vec![row(&[("k", Value::from(2i64)), ("b", Value::from("y"))])];
    let out = OuterJoiner::new().join(&keys(&["k"]), left, right.clone()).unwrap();
    assert_eq!(out, right);
}

#[test]
fn left_join_keeps_left_rows_and_drops_unmatched_right() {
    let left = vec![row(&[("k", Value::from(1i64)), ("a", Value::from("x"))])];
    let right: Vec<Row> = Vec::new();
    let out = LeftJoiner::new().join(&keys(&["k"]), left.clone(), right).unwrap();
    assert_eq!(out, left);

    let left: Vec<Row> = Vec::new();
    let right = vec![row(&[("k", Value::from(2i64)), ("b", Value::from("y"))])];
    let out = LeftJoiner::new().join(&keys(&["k"]), left, right).unwrap();
    assert!(out.is_empty());
}

#[test]
fn right_join_keeps_right_rows_and_drops_unmatched_left() {
    let left: Vec<Row> = Vec::new();
    let right = vec![row(&[("k", Value::from(2i64)), ("b", Value::from("y"))])];
    let out = RightJoiner::new().join(&keys(&["k"]), left, right.clone()).unwrap();
    assert_eq!(out, right);

    let left = vec![row(&[("k", Value::from(1i64)), ("a", Value::from("x"))])];
    let right: Vec<Row> = Vec::new();
    let out = RightJoiner::new().join(&keys(&["k"]), left, right).unwrap();
    assert!(out.is_empty());
}

#[test]
fn colliding_non_key_columns_get_the_default_suffixes() {
    let left = vec![row(&[("k", Value::from(1i64)), ("v", Value::from(10i64))])];
    let right = vec![row(&[("k", Value::from(1i64)), ("v", Value::from(20i64))])];
    let out = InnerJoiner::new().join(&keys(&["k"]), left, right).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(*out[0].get("v_1").unwrap(), Value::Int(10));
    assert_eq!(*out[0].get("v_2").unwrap(), Value::Int(20));
    assert!(!out[0].contains("v"));
}

#[test]
fn custom_suffixes_override_the_defaults() {
    let left = vec![row(&[("k", Value::from(1i64)), ("v", Value::from(10i64))])];
    let right = vec![row(&[("k", Value::from(1i64)), ("v", Value::from(20i64))])];
    let out = InnerJoiner::with_suffixes("_left", "_right")
        .join(&keys(&["k"]), left, right)
        .unwrap();
    assert_eq!(*out[0].get("v_left").unwrap(), Value::Int(10));
    assert_eq!(*out[0].get("v_right").unwrap(), Value::Int(20));
}
