//! `word-count INPUT OUTPUT` -- counts word occurrences in an NDJSON file of `{"text": ...}` rows.

use anyhow::{Context, Result};
use compgraph::graph;
use compgraph::ndjson;
use compgraph::read::Inputs;
use compgraph::recipes::word_count_graph;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().context("usage: word-count INPUT OUTPUT")?;
    let output_path = args.next().context("usage: word-count INPUT OUTPUT")?;

    let graph = word_count_graph("input", "text", "count");

    let mut inputs = Inputs::new();
    inputs.insert("input".to_string(), graph::input(move || ndjson::open_rows(&input_path)));

    let rows = graph.run(&inputs)?;
    let written = ndjson::write_ndjson_file(&output_path, rows)?;
    eprintln!("wrote {written} rows to {output_path}");
    Ok(())
}
