//! `maps_speed LEN_INPUT TIME_INPUT OUTPUT` -- average speed in km/h by weekday and hour.
//!
//! `LEN_INPUT` holds NDJSON rows shaped `{"edge_id": ..., "start": [lng, lat], "end": [lng, lat]}`;
//! `TIME_INPUT` holds rows shaped `{"edge_id": ..., "enter_time": "...", "leave_time": "..."}`.

use anyhow::{Context, Result};
use compgraph::graph;
use compgraph::ndjson;
use compgraph::read::Inputs;
use compgraph::recipes::yandex_maps_graph;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let length_path = args.next().context("usage: maps_speed LEN_INPUT TIME_INPUT OUTPUT")?;
    let time_path = args.next().context("usage: maps_speed LEN_INPUT TIME_INPUT OUTPUT")?;
    let output_path = args.next().context("usage: maps_speed LEN_INPUT TIME_INPUT OUTPUT")?;

    let graph = yandex_maps_graph(
        "time",
        "length",
        "enter_time",
        "leave_time",
        "edge_id",
        "start",
        "end",
        "weekday",
        "hour",
        "speed",
    );

    let mut inputs = Inputs::new();
    inputs.insert("length".to_string(), graph::input(move || ndjson::open_rows(&length_path)));
    inputs.insert("time".to_string(), graph::input(move || ndjson::open_rows(&time_path)));

    let rows = graph.run(&inputs)?;
    let written = ndjson::write_ndjson_file(&output_path, rows)?;
    eprintln!("wrote {written} rows to {output_path}");
    Ok(())
}
