use compgraph::kernel::mappers::{
    Apply, FilterPunctuation, HaversineDist, LowerCase, Product, Project, Remove, Split, StringToDateTime,
};
use compgraph::kernel::Mapper;
use compgraph::value::{Row, Value};

fn row(pairs: &[(&str, Value)]) -> Row {
    let mut r = Row::new();
    for (k, v) in pairs {
        r.set(*k, v.clone());
    }
    r
}

#[test]
fn filter_punctuation_and_lower_case() {
    let input = row(&[("doc", Value::from(1i64)), ("text", Value::from("Hello, hello world!"))]);
    let cleaned = FilterPunctuation::new("text").apply(input).unwrap();
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].get("text").unwrap().as_str("text").unwrap(), "Hello hello world");

    let lowered = LowerCase::new("text").apply(cleaned.into_iter().next().unwrap()).unwrap();
    assert_eq!(lowered[0].get("text").unwrap().as_str("text").unwrap(), "hello hello world");
}

#[test]
fn split_emits_one_row_per_token_and_drops_the_original_column_value() {
    let input = row(&[("text", Value::from("hello world"))]);
    let out = Split::new("text").apply(input).unwrap();
    let words: Vec<&str> = out.iter().map(|r| r.get("text").unwrap().as_str("text").unwrap()).collect();
    assert_eq!(words, vec!["hello", "world"]);
}

#[test]
fn split_emits_one_empty_row_per_separator_char_with_no_coalescing() {
    // `[\s+]` is a character class: it matches one whitespace char at a time,
    // not a run of them, so adjacent separators yield empty segments.
    let input = row(&[("text", Value::from("   "))]);
    let out = Split::new("text").apply(input).unwrap();
    let words: Vec<&str> = out.iter().map(|r| r.get("text").unwrap().as_str("text").unwrap()).collect();
    assert_eq!(words, vec!["", "", ""]);
}

#[test]
fn split_default_separator_also_matches_a_literal_plus() {
    // `[\s+]` puts `+` inside the character class, so it is a literal
    // delimiter too, not a quantifier on the preceding `\s`.
    let input = row(&[("text", Value::from("a+b"))]);
    let out = Split::new("text").apply(input).unwrap();
    let words: Vec<&str> = out.iter().map(|r| r.get("text").unwrap().as_str("text").unwrap()).collect();
    assert_eq!(words, vec!["a", "b"]);
}

#[test]
fn split_keeps_a_trailing_non_empty_tail() {
    let input = row(&[("text", Value::from("a b "))]);
    let out = Split::new("text").apply(input).unwrap();
    let words: Vec<&str> = out.iter().map(|r| r.get("text").unwrap().as_str("text").unwrap()).collect();
    assert_eq!(words, vec!["a", "b"]);
}

#[test]
fn project_and_remove_are_inverses_over_the_full_column_set() {
    let input = row(&[("a", Value::from(1i64)), ("b", Value::from(2i64)), ("c", Value::from(3i64))]);

    let projected = Project::new(["a", "c"]).apply(input.clone()).unwrap();
    assert_eq!(projected.len(), 1);
    assert!(projected[0].contains("a") && !projected[0].contains("b") && projected[0].contains("c"));

    let removed = Remove::new(["b"]).apply(input).unwrap();
    assert!(removed[0].contains("a") && !removed[0].contains("b") && removed[0].contains("c"));
}

#[test]
fn product_promotes_to_float_as_soon_as_one_input_is_float() {
    let all_int = row(&[("x", Value::from(3i64)), ("y", Value::from(4i64))]);
    let out = Product::new(["x", "y"], "p").apply(all_int).unwrap();
    assert_eq!(*out[0].get("p").unwrap(), Value::Int(12));

    let mixed = row(&[("x", Value::from(3i64)), ("y", Value::from(2.5f64))]);
    let out = Product::new(["x", "y"], "p").apply(mixed).unwrap();
    assert_eq!(out[0].get("p").unwrap().as_f64("p").unwrap(), 7.5);
}

#[test]
fn apply_computes_a_new_column_from_existing_ones() {
    let input = row(&[("a", Value::from(2i64)), ("b", Value::from(3i64))]);
    let mapper = Apply::new(["a", "b"], "sum", |args: &[Value]| {
        Ok(Value::from(args[0].as_i64("a")? + args[1].as_i64("b")?))
    });
    let out = mapper.apply(input).unwrap();
    assert_eq!(*out[0].get("sum").unwrap(), Value::Int(5));
}

#[test]
fn string_to_date_time_accepts_both_fractional_and_whole_second_formats() {
    let with_fraction = row(&[("t", Value::from("20240101T120000.500000"))]);
    let out = StringToDateTime::new(["t"]).apply(with_fraction).unwrap();
    assert!(matches!(out[0].get("t").unwrap(), Value::Timestamp(_)));

    let without_fraction = row(&[("t", Value::from("20240101T120000"))]);
    let out = StringToDateTime::new(["t"]).apply(without_fraction).unwrap();
    assert!(matches!(out[0].get("t").unwrap(), Value::Timestamp(_)));
}

fn coord(lng: f64, lat: f64) -> Value {
    Value::Tuple(vec![Value::from(lng), Value::from(lat)])
}

#[test]
fn haversine_of_a_point_with_itself_is_zero() {
    let input = row(&[("start", coord(37.6, 55.75)), ("end", coord(37.6, 55.75))]);
    let out = HaversineDist::new("start", "end", "length").apply(input).unwrap();
    let dist = out[0].get("length").unwrap().as_f64("length").unwrap();
    assert!(dist.abs() < 1e-6);
}

#[test]
fn haversine_pole_to_equator_quarter_meridian() {
    let input = row(&[("start", coord(0.0, 0.0)), ("end", coord(0.0, 90.0))]);
    let out = HaversineDist::new("start", "end", "length").apply(input).unwrap();
    let dist = out[0].get("length").unwrap().as_f64("length").unwrap();
    let expected = 6373.0 * std::f64::consts::PI / 2.0;
    assert!((dist - expected).abs() < 0.5, "got {dist}, expected ~{expected}");
}
