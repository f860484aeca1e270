//! `pmi INPUT OUTPUT` -- top-10-by-PMI words per document from NDJSON `{"doc_id": ..., "text": ...}` rows.

use anyhow::{Context, Result};
use compgraph::graph;
use compgraph::ndjson;
use compgraph::read::Inputs;
use compgraph::recipes::pmi_graph;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().context("usage: pmi INPUT OUTPUT")?;
    let output_path = args.next().context("usage: pmi INPUT OUTPUT")?;

    let graph = pmi_graph("input", "doc_id", "text", "pmi");

    let mut inputs = Inputs::new();
    inputs.insert("input".to_string(), graph::input(move || ndjson::open_rows(&input_path)));

    let rows = graph.run(&inputs)?;
    let written = ndjson::write_ndjson_file(&output_path, rows)?;
    eprintln!("wrote {written} rows to {output_path}");
    Ok(())
}
