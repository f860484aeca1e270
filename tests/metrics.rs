use compgraph::graph;
use compgraph::kernel::joiners::InnerJoiner;
use compgraph::kernel::reducers::Count;
use compgraph::metrics::{CounterMetric, MetricsCollector};
use compgraph::read::Inputs;
use compgraph::value::{Row, Value};
use compgraph::Graph;

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
fn increment_counter_creates_and_accumulates() {
    let metrics = MetricsCollector::new();
    metrics.increment_counter("rows_read", 5);
    metrics.increment_counter("rows_read", 3);
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.get("rows_read").unwrap(), &serde_json::json!(8));
}

#[test]
fn set_counter_overwrites_rather_than_accumulates() {
    let metrics = MetricsCollector::new();
    metrics.set_counter("x", 10);
    metrics.set_counter("x", 2);
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.get("x").unwrap(), &serde_json::json!(2));
}

#[test]
fn registering_a_custom_counter_makes_it_visible_in_the_snapshot() {
    let mut metrics = MetricsCollector::new();
    metrics.register(Box::new(CounterMetric::with_value("custom", 42)));
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.get("custom").unwrap(), &serde_json::json!(42));
}

#[test]
fn reduce_and_join_increment_their_ambient_counters() {
    let left = vec![
        row(&[("k", Value::from(1i64))]),
        row(&[("k", Value::from(1i64))]),
        row(&[("k", Value::from(2i64))]),
    ];
    let right = vec![row(&[("k", Value::from(1i64)), ("r", Value::from("x"))])];

    let left_graph = Graph::from_iter("left").sort(["k"]).reduce(Count::new("n"), ["k"]);
    let right_graph = Graph::from_iter("right").sort(["k"]);
    let joined = left_graph.join(InnerJoiner::new(), &right_graph, ["k"]);

    let mut inputs = Inputs::new();
    inputs.insert("left".to_string(), graph::input(source(left)));
    inputs.insert("right".to_string(), graph::input(source(right)));

    let metrics = MetricsCollector::new();
    let out: Vec<Row> = joined
        .run_with_metrics(&inputs, Some(metrics.clone()))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(!out.is_empty());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.get("groups_reduced").unwrap(), &serde_json::json!(2));
    assert!(snapshot.contains_key("join_groups"));
}

#[test]
fn sort_spilling_increments_sort_runs_spilled() {
    use compgraph::ExternalSort;

    let rows: Vec<Row> = (0..6).map(|i| row(&[("k", Value::from(i as i64))])).collect();
    let metrics = MetricsCollector::new();
    let stream: compgraph::kernel::RowStream = Box::new(rows.into_iter().map(Ok));
    let out: Vec<Row> = ExternalSort::with_chunk_rows(["k"], 2)
        .run_with_metrics(stream, Some(metrics.clone()))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(out.len(), 6);

    let snapshot = metrics.snapshot();
    let spilled = snapshot.get("sort_runs_spilled").unwrap().as_u64().unwrap();
    assert!(spilled >= 3, "expected at least 3 spilled runs, got {spilled}");
}
