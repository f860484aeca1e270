//! `inverted_index INPUT OUTPUT` -- top-3 TF-IDF words per document from NDJSON `{"doc_id": ..., "text": ...}` rows.

use anyhow::{Context, Result};
use compgraph::graph;
use compgraph::ndjson;
use compgraph::read::Inputs;
use compgraph::recipes::inverted_index_graph;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().context("usage: inverted_index INPUT OUTPUT")?;
    let output_path = args.next().context("usage: inverted_index INPUT OUTPUT")?;

    let graph = inverted_index_graph("input", "doc_id", "text", "tf_idf");

    let mut inputs = Inputs::new();
    inputs.insert("input".to_string(), graph::input(move || ndjson::open_rows(&input_path)));

    let rows = graph.run(&inputs)?;
    let written = ndjson::write_ndjson_file(&output_path, rows)?;
    eprintln!("wrote {written} rows to {output_path}");
    Ok(())
}
