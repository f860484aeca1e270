use compgraph::graph;
use compgraph::kernel::mappers::{Filter, Project};
use compgraph::kernel::reducers::Count;
use compgraph::read::Inputs;
use compgraph::value::{Row, Value};
use compgraph::{Graph, GraphError};

fn row(pairs: &[(&str, Value)]) -> Row {
    let mut r = Row::new();
    for (k, v) in pairs {
        r.set(*k, v.clone());
    }
    r
}

fn source(rows: Vec<Row>) -> impl Fn() -> compgraph::kernel::RowStream + Send + Sync + 'static {
    move || Box::new(rows.clone().into_iter().map(Ok))
}

#[test]
fn missing_input_raises_missing_input_error() {
    let graph = Graph::from_iter("nonexistent");
    let inputs = Inputs::new();
    match graph.run(&inputs) {
        Err(GraphError::MissingInput(name)) => assert_eq!(name, "nonexistent"),
        other => panic!("expected MissingInput error, got {other:?}"),
    }
}

#[test]
fn rerun_is_deterministic() {
    let data = vec![
        row(&[("k", Value::from(2i64)), ("v", Value::from("b"))]),
        row(&[("k", Value::from(1i64)), ("v", Value::from("a"))]),
        row(&[("k", Value::from(1i64)), ("v", Value::from("a"))]),
    ];

    let graph = Graph::from_iter("in").sort(["k"]).reduce(Count::new("n"), ["k"]);

    let mut inputs = Inputs::new();
    inputs.insert("in".to_string(), graph::input(source(data)));

    let first: Vec<Row> = graph.run(&inputs).unwrap().collect::<Result<_, _>>().unwrap();
    let second: Vec<Row> = graph.run(&inputs).unwrap().collect::<Result<_, _>>().unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn map_flattens_filter_and_project() {
    let data = vec![
        row(&[("a", Value::from(1i64)), ("b", Value::from("x"))]),
        row(&[("a", Value::from(2i64)), ("b", Value::from("y"))]),
        row(&[("a", Value::from(3i64)), ("b", Value::from("z"))]),
    ];

    let graph = Graph::from_iter("in")
        .map(Filter::new(|r: &Row| r.get("a").unwrap().as_i64("a").unwrap() % 2 == 1))
        .map(Project::new(["b"]));

    let mut inputs = Inputs::new();
    inputs.insert("in".to_string(), graph::input(source(data)));

    let out: Vec<Row> = graph.run(&inputs).unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(out.len(), 2);
    for r in &out {
        assert!(!r.contains("a"));
        assert!(r.contains("b"));
    }
}
