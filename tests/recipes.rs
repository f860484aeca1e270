use compgraph::graph;
use compgraph::read::Inputs;
use compgraph::recipes::{inverted_index_graph, pmi_graph, word_count_graph};
use compgraph::value::{Row, Value};

fn text_row(text: &str) -> Row {
    let mut r = Row::new();
    r.set("text", Value::from(text));
    r
}

fn doc_row(doc_id: &str, text: &str) -> Row {
    let mut r = Row::new();
    r.set("doc_id", Value::from(doc_id));
    r.set("text", Value::from(text));
    r
}

fn source(rows: Vec<Row>) -> impl Fn() -> compgraph::kernel::RowStream + Send + Sync + 'static {
    move || Box::new(rows.clone().into_iter().map(Ok))
}

#[test]
fn word_count_graph_counts_and_sorts_by_count_then_text() {
    let graph = word_count_graph("input", "text", "count");

    let mut inputs = Inputs::new();
    inputs.insert(
        "input".to_string(),
        graph::input(source(vec![text_row("hello world"), text_row("hello rust")])),
    );

    let out: Vec<Row> = graph.run(&inputs).unwrap().collect::<Result<_, _>>().unwrap();
    let pairs: Vec<(String, i64)> = out
        .iter()
        .map(|r| {
            (
                r.get("text").unwrap().as_str("text").unwrap().to_string(),
                r.get("count").unwrap().as_i64("count").unwrap(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![("rust".to_string(), 1), ("world".to_string(), 1), ("hello".to_string(), 2)]
    );
}

#[test]
fn inverted_index_graph_keeps_at_most_three_words_per_document() {
    let graph = inverted_index_graph("input", "doc_id", "text", "tf_idf");

    let mut inputs = Inputs::new();
    inputs.insert(
        "input".to_string(),
        graph::input(source(vec![
            doc_row("doc1", "the cat sat on the mat"),
            doc_row("doc2", "the dog sat in the yard"),
        ])),
    );

    let out: Vec<Row> = graph.run(&inputs).unwrap().collect::<Result<_, _>>().unwrap();
    assert!(!out.is_empty());

    let mut per_doc: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for r in &out {
        assert!(r.contains("tf_idf"));
        let doc = r.get("doc_id").unwrap().as_str("doc_id").unwrap().to_string();
        *per_doc.entry(doc).or_insert(0) += 1;
    }
    for count in per_doc.values() {
        assert!(*count <= 3);
    }
}

#[test]
fn pmi_graph_only_ranks_words_longer_than_four_characters() {
    let graph = pmi_graph("input", "doc_id", "text", "pmi");

    let mut inputs = Inputs::new();
    inputs.insert(
        "input".to_string(),
        graph::input(source(vec![
            doc_row("doc1", "hello hello world friends"),
            doc_row("doc2", "hello world strangers here"),
        ])),
    );

    let out: Vec<Row> = graph.run(&inputs).unwrap().collect::<Result<_, _>>().unwrap();
    for r in &out {
        let word = r.get("text").unwrap().as_str("text").unwrap();
        assert!(word.len() > 4, "unexpectedly short word in pmi output: {word}");
    }
}
