//! Thin, non-core dataflow recipes built entirely on the public [`Graph`] API.
//!
//! None of this module touches engine internals: every recipe here is
//! exactly what an application author could write themselves by chaining
//! [`Graph::map`], [`Graph::sort`], [`Graph::reduce`], and [`Graph::join`].
//! They exist as worked examples and as the graphs the bundled demos run.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::kernel::joiners::InnerJoiner;
use crate::kernel::mappers::{
    Apply, FilterPunctuation, HaversineDist, LowerCase, Project, Remove, Split, StringToDateTime,
};
use crate::kernel::mappers::Filter as FilterMapper;
use crate::kernel::reducers::{Count, First, Index, MeanSpeed, TermFrequency, TopN};
use crate::value::Value;
use chrono::Timelike;

fn arg_f64(args: &[Value], i: usize, column: &str) -> Result<f64> {
    args.get(i)
        .ok_or_else(|| GraphError::Key(column.to_string()))?
        .as_f64(column)
}

/// Counts occurrences of each word across every row's `text_column`.
///
/// Output rows hold `{text_column, count_column}`, sorted by `(count, text)`.
#[must_use]
pub fn word_count_graph(input_stream_name: &str, text_column: &str, count_column: &str) -> Graph {
    Graph::from_iter(input_stream_name)
        .map(FilterPunctuation::new(text_column))
        .map(LowerCase::new(text_column))
        .map(Split::new(text_column))
        .sort([text_column])
        .reduce(Count::new(count_column), [text_column])
        .sort([count_column, text_column])
}

/// Computes TF-IDF for every `(word, doc)` pair, keeping the top 3 words per document.
#[must_use]
pub fn inverted_index_graph(
    input_stream_name: &str,
    doc_column: &str,
    text_column: &str,
    result_column: &str,
) -> Graph {
    let split_words = Graph::from_iter(input_stream_name)
        .map(FilterPunctuation::new(text_column))
        .map(LowerCase::new(text_column))
        .map(Split::new(text_column));

    let doc_count = Graph::from_iter(input_stream_name)
        .sort([doc_column])
        .reduce(First, [doc_column])
        .reduce(Count::new("num_docs"), Vec::<String>::new());

    let count_idf = split_words
        .sort([text_column, doc_column])
        .reduce(First, [text_column, doc_column])
        .reduce(Count::new("num_words_for_doc"), [text_column])
        .join(InnerJoiner::default(), &doc_count, Vec::<String>::new())
        .map(Apply::new(["num_docs", "num_words_for_doc"], "idf", |args: &[Value]| {
            let num_docs = arg_f64(args, 0, "num_docs")?;
            let num_words_for_doc = arg_f64(args, 1, "num_words_for_doc")?;
            Ok(Value::from((num_docs / num_words_for_doc).ln()))
        }));

    split_words
        .sort([doc_column])
        .reduce(TermFrequency::new(text_column), [doc_column])
        .sort([text_column])
        .join(InnerJoiner::default(), &count_idf, [text_column])
        .map(Apply::new(["tf", "idf"], result_column, |args: &[Value]| {
            Ok(Value::from(arg_f64(args, 0, "tf")? * arg_f64(args, 1, "idf")?))
        }))
        .map(Project::new([text_column, doc_column, result_column]))
        .reduce(TopN::new(result_column, 3), [text_column])
}

/// Ranks, for every document, its top-10 words by pointwise mutual information.
#[must_use]
pub fn pmi_graph(input_stream_name: &str, doc_column: &str, text_column: &str, result_column: &str) -> Graph {
    let text_column_owned = text_column.to_string();
    let split_words = Graph::from_iter(input_stream_name)
        .map(FilterPunctuation::new(text_column))
        .map(LowerCase::new(text_column))
        .map(Split::new(text_column))
        .map(FilterMapper::new(move |row| {
            row.get(&text_column_owned)
                .and_then(|v| v.as_str(&text_column_owned))
                .is_ok_and(|s| s.len() > 4)
        }));

    let indexed_words = split_words.reduce(Index::new("index"), Vec::<String>::new());

    let filtered_count = indexed_words
        .sort([text_column, doc_column])
        .reduce(Count::new("num_words_for_doc"), [text_column, doc_column])
        .map(FilterMapper::new(|row| {
            row.get("num_words_for_doc")
                .ok()
                .and_then(|v| v.as_i64("num_words_for_doc").ok())
                .is_some_and(|n| n >= 2)
        }));

    let filtered_table = indexed_words
        .sort([text_column, doc_column])
        .join(InnerJoiner::default(), &filtered_count, [text_column, doc_column])
        .map(Project::new([text_column, doc_column]));

    let tf = filtered_table
        .sort([doc_column])
        .reduce(TermFrequency::new(text_column), [doc_column]);

    let num_words_for_doc = filtered_table
        .sort([text_column, doc_column])
        .reduce(Count::new("num_words_for_doc"), [text_column]);

    let all_numb_words = filtered_table.reduce(Count::new("all_numb_words"), Vec::<String>::new());

    let added_all_number = num_words_for_doc.join(InnerJoiner::default(), &all_numb_words, Vec::<String>::new());

    let added_pmi_metric = added_all_number
        .join(InnerJoiner::default(), &tf.sort([text_column]), [text_column])
        .map(Apply::new(
            ["num_words_for_doc", "all_numb_words", "tf"],
            result_column,
            |args: &[Value]| {
                let nwfd = arg_f64(args, 0, "num_words_for_doc")?;
                let anw = arg_f64(args, 1, "all_numb_words")?;
                let tf_ind = arg_f64(args, 2, "tf")?;
                Ok(Value::from((tf_ind / (nwfd / anw)).ln()))
            },
        ))
        .map(Project::new([text_column, doc_column, result_column]))
        .sort([doc_column, text_column]);

    let sorted_words = indexed_words
        .sort([doc_column, text_column])
        .reduce(First, [doc_column, text_column]);

    added_pmi_metric
        .join(InnerJoiner::default(), &sorted_words, [doc_column, text_column])
        .sort(["index"])
        .map(Project::new([doc_column, text_column, result_column]))
}

/// Measures average speed in km/h by weekday and hour of day from two input streams:
/// one of road-segment lengths, one of time-stamped travel events.
#[must_use]
pub fn yandex_maps_graph(
    input_stream_name_time: &str,
    input_stream_name_length: &str,
    enter_time_column: &str,
    leave_time_column: &str,
    edge_id_column: &str,
    start_coord_column: &str,
    end_coord_column: &str,
    weekday_result_column: &str,
    hour_result_column: &str,
    speed_result_column: &str,
) -> Graph {
    let length = Graph::from_iter(input_stream_name_length)
        .map(HaversineDist::new(start_coord_column, end_coord_column, "length"))
        .map(Project::new([edge_id_column, "length"]))
        .sort([edge_id_column]);

    let enter_col = enter_time_column.to_string();
    let leave_col = leave_time_column.to_string();
    let enter_col_hour = enter_time_column.to_string();
    let enter_col_weekday = enter_time_column.to_string();

    let duration = Graph::from_iter(input_stream_name_time)
        .map(StringToDateTime::new([enter_time_column, leave_time_column]))
        .map(Apply::new([enter_time_column, leave_time_column], "duration", move |args: &[Value]| {
            let t1 = args[0].as_timestamp(&enter_col)?;
            let t2 = args[1].as_timestamp(&leave_col)?;
            Ok(Value::from((t2 - t1).num_milliseconds() as f64 / 1000.0 / 3600.0))
        }))
        .map(Apply::new([enter_time_column], hour_result_column, move |args: &[Value]| {
            Ok(Value::Int(i64::from(args[0].as_timestamp(&enter_col_hour)?.hour())))
        }))
        .map(Apply::new([enter_time_column], weekday_result_column, move |args: &[Value]| {
            Ok(Value::from(args[0].as_timestamp(&enter_col_weekday)?.format("%a").to_string()))
        }))
        .map(Remove::new([enter_time_column, leave_time_column]))
        .sort([edge_id_column]);

    duration
        .join(InnerJoiner::default(), &length, [edge_id_column])
        .sort([weekday_result_column, hour_result_column])
        .reduce(
            MeanSpeed::new("length", "duration", speed_result_column),
            [weekday_result_column, hour_result_column],
        )
        .map(Remove::new(["length", "duration"]))
}
