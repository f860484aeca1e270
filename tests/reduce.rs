use compgraph::kernel::reducers::{Count, Index, Mean, MeanSpeed, Sum, TermFrequency, TopN};
use compgraph::kernel::Reducer;
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
fn count_only_copies_group_keys_present_on_the_first_row() {
    let group = vec![
        row(&[("word", Value::from("a"))]),
        row(&[("word", Value::from("a"))]),
        row(&[("word", Value::from("a"))]),
    ];
    let out = Count::new("count").reduce(&keys(&["word"]), group).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].get("word").unwrap().as_str("word").unwrap(), "a");
    assert_eq!(*out[0].get("count").unwrap(), Value::Int(3));
}

#[test]
fn count_silently_drops_a_group_key_missing_from_the_first_row() {
    let group = vec![row(&[("other", Value::from(1i64))])];
    let out = Count::new("count").reduce(&keys(&["word"]), group).unwrap();
    assert_eq!(out.len(), 1);
    assert!(!out[0].contains("word"));
    assert_eq!(*out[0].get("count").unwrap(), Value::Int(1));
}

#[test]
fn sum_stays_integer_until_a_float_input_appears() {
    let ints = vec![
        row(&[("k", Value::from(1i64)), ("x", Value::from(2i64))]),
        row(&[("k", Value::from(1i64)), ("x", Value::from(3i64))]),
    ];
    let out = Sum::new("x").reduce(&keys(&["k"]), ints).unwrap();
    assert_eq!(*out[0].get("x").unwrap(), Value::Int(5));

    let mixed = vec![
        row(&[("k", Value::from(1i64)), ("x", Value::from(2i64))]),
        row(&[("k", Value::from(1i64)), ("x", Value::from(1.5f64))]),
    ];
    let out = Sum::new("x").reduce(&keys(&["k"]), mixed).unwrap();
    assert_eq!(out[0].get("x").unwrap().as_f64("x").unwrap(), 3.5);
}

#[test]
fn mean_averages_the_column_across_the_group() {
    let group = vec![
        row(&[("k", Value::from(1i64)), ("x", Value::from(1i64))]),
        row(&[("k", Value::from(1i64)), ("x", Value::from(2i64))]),
        row(&[("k", Value::from(1i64)), ("x", Value::from(3i64))]),
    ];
    let out = Mean::new("x").reduce(&keys(&["k"]), group).unwrap();
    assert_eq!(out[0].get("x").unwrap().as_f64("x").unwrap(), 2.0);
}

#[test]
fn mean_speed_divides_total_distance_by_total_time() {
    let group = vec![
        row(&[("dist", Value::from(10.0)), ("time", Value::from(1.0))]),
        row(&[("dist", Value::from(10.0)), ("time", Value::from(1.0))]),
    ];
    let out = MeanSpeed::new("dist", "time", "speed").reduce(&[], group).unwrap();
    assert_eq!(out[0].get("speed").unwrap().as_f64("speed").unwrap(), 10.0);
}

#[test]
fn index_assigns_zero_based_positions_in_arrival_order() {
    let group = vec![row(&[]), row(&[]), row(&[])];
    let out = Index::new("i").reduce(&[], group).unwrap();
    let positions: Vec<i64> = out.iter().map(|r| r.get("i").unwrap().as_i64("i").unwrap()).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn term_frequency_emits_distinct_values_in_first_seen_order() {
    let group = vec![
        row(&[("w", Value::from("a"))]),
        row(&[("w", Value::from("b"))]),
        row(&[("w", Value::from("a"))]),
    ];
    let out = TermFrequency::new("w").reduce(&[], group).unwrap();
    let words: Vec<&str> = out.iter().map(|r| r.get("w").unwrap().as_str("w").unwrap()).collect();
    assert_eq!(words, vec!["a", "b"]);
    assert!((out[0].get("tf").unwrap().as_f64("tf").unwrap() - 2.0 / 3.0).abs() < 1e-9);
    assert!((out[1].get("tf").unwrap().as_f64("tf").unwrap() - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn top_n_breaks_ties_by_earliest_arrival_and_drops_the_rest() {
    let group = vec![
        row(&[("x", Value::from(5i64))]),
        row(&[("x", Value::from(5i64))]),
        row(&[("x", Value::from(3i64))]),
    ];
    let out = TopN::new("x", 2).reduce(&[], group).unwrap();
    assert_eq!(out.len(), 2);
    for r in &out {
        assert_eq!(*r.get("x").unwrap(), Value::Int(5));
    }
}

#[test]
fn top_n_of_zero_emits_nothing() {
    let group = vec![row(&[("x", Value::from(1i64))])];
    let out = TopN::new("x", 0).reduce(&[], group).unwrap();
    assert!(out.is_empty());
}
