//! Concrete [`Reducer`] kernels.

use super::Reducer;
use crate::error::Result;
use crate::value::{Row, Value};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

fn key_row(keys: &[String], first: &Row) -> Result<Row> {
    let mut out = Row::new();
    for k in keys {
        out.set(k.clone(), first.get(k)?.clone());
    }
    Ok(out)
}

/// Yields only the first row of each group.
#[derive(Clone, Copy, Debug, Default)]
pub struct First;

impl Reducer for First {
    fn reduce(&self, _keys: &[String], group: Vec<Row>) -> Result<Vec<Row>> {
        Ok(group.into_iter().take(1).collect())
    }
}

/// Sums a numeric column within each group.
#[derive(Clone, Debug)]
pub struct Sum {
    pub column: String,
}

impl Sum {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Sum {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> Result<Vec<Row>> {
        let mut iter = group.into_iter();
        let Some(first) = iter.next() else {
            return Ok(Vec::new());
        };
        let mut out = key_row(keys, &first)?;
        let mut int_total: i64 = 0;
        let mut float_total = 0.0f64;
        let mut all_int = true;
        for row in std::iter::once(first).chain(iter) {
            let v = row.get(&self.column)?;
            match v {
                Value::Int(n) => {
                    int_total += n;
                    float_total += *n as f64;
                }
                other => {
                    all_int = false;
                    float_total += other.as_f64(&self.column)?;
                }
            }
        }
        out.set(
            self.column.clone(),
            if all_int { Value::Int(int_total) } else { Value::Float(float_total.into()) },
        );
        Ok(vec![out])
    }
}

/// Averages a numeric column within each group.
#[derive(Clone, Debug)]
pub struct Mean {
    pub column: String,
}

impl Mean {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Mean {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> Result<Vec<Row>> {
        let mut iter = group.into_iter();
        let Some(first) = iter.next() else {
            return Ok(Vec::new());
        };
        let mut out = key_row(keys, &first)?;
        let mut total = first.get(&self.column)?.as_f64(&self.column)?;
        let mut n = 1u64;
        for row in iter {
            total += row.get(&self.column)?.as_f64(&self.column)?;
            n += 1;
        }
        out.set(self.column.clone(), total / n as f64);
        Ok(vec![out])
    }
}

/// Computes average speed (distance / time) across a group.
#[derive(Clone, Debug)]
pub struct MeanSpeed {
    pub dist_column: String,
    pub time_column: String,
    pub result_column: String,
}

impl MeanSpeed {
    #[must_use]
    pub fn new(
        dist_column: impl Into<String>,
        time_column: impl Into<String>,
        result_column: impl Into<String>,
    ) -> Self {
        Self {
            dist_column: dist_column.into(),
            time_column: time_column.into(),
            result_column: result_column.into(),
        }
    }
}

impl Reducer for MeanSpeed {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> Result<Vec<Row>> {
        let mut iter = group.into_iter();
        let Some(first) = iter.next() else {
            return Ok(Vec::new());
        };
        let mut out = key_row(keys, &first)?;
        let mut sum_dist = first.get(&self.dist_column)?.as_f64(&self.dist_column)?;
        let mut sum_time = first.get(&self.time_column)?.as_f64(&self.time_column)?;
        for row in iter {
            sum_dist += row.get(&self.dist_column)?.as_f64(&self.dist_column)?;
            sum_time += row.get(&self.time_column)?.as_f64(&self.time_column)?;
        }
        out.set(self.result_column.clone(), sum_dist / sum_time);
        Ok(vec![out])
    }
}

/// Counts rows per group.
///
/// Copies only the group-key columns that are actually present on the first
/// row of the group into the output -- a group key missing from that row is
/// silently dropped from the result rather than raising, which mirrors the
/// reducer this was ported from.
#[derive(Clone, Debug)]
pub struct Count {
    pub column: String,
}

impl Count {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Count {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> Result<Vec<Row>> {
        let mut iter = group.into_iter();
        let Some(first) = iter.next() else {
            return Ok(Vec::new());
        };
        let mut out = Row::new();
        for k in keys {
            if let Ok(v) = first.get(k) {
                out.set(k.clone(), v.clone());
            }
        }
        let mut count: i64 = 1;
        for _ in iter {
            count += 1;
        }
        out.set(self.column.clone(), count);
        Ok(vec![out])
    }
}

/// Assigns a zero-based positional index to each row within its group.
#[derive(Clone, Debug)]
pub struct Index {
    pub column: String,
}

impl Index {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Index {
    fn reduce(&self, _keys: &[String], group: Vec<Row>) -> Result<Vec<Row>> {
        Ok(group
            .into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                row.set(self.column.clone(), i as i64);
                row
            })
            .collect())
    }
}

/// Emits the frequency (`count / group size`) of each distinct value in a column.
///
/// Distinct values are emitted in first-seen order within the group.
#[derive(Clone, Debug)]
pub struct TermFrequency {
    pub words_column: String,
    pub result_column: String,
}

impl TermFrequency {
    #[must_use]
    pub fn new(words_column: impl Into<String>) -> Self {
        Self {
            words_column: words_column.into(),
            result_column: "tf".to_string(),
        }
    }

    #[must_use]
    pub fn with_result_column(words_column: impl Into<String>, result_column: impl Into<String>) -> Self {
        Self {
            words_column: words_column.into(),
            result_column: result_column.into(),
        }
    }
}

impl Reducer for TermFrequency {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> Result<Vec<Row>> {
        let mut order: Vec<Value> = Vec::new();
        let mut counts: HashMap<Value, i64> = HashMap::new();
        let mut base: Option<Row> = None;
        let mut total = 0i64;
        for row in &group {
            if base.is_none() {
                base = Some(key_row(keys, row)?);
            }
            let value = row.get(&self.words_column)?.clone();
            let entry = counts.entry(value.clone()).or_insert(0);
            if *entry == 0 {
                order.push(value);
            }
            *entry += 1;
            total += 1;
        }
        let Some(base) = base else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(order.len());
        for value in order {
            let mut row = base.clone();
            let count = counts[&value];
            row.set(self.words_column.clone(), value);
            row.set(self.result_column.clone(), count as f64 / total as f64);
            out.push(row);
        }
        Ok(out)
    }
}

#[derive(Clone, Debug)]
struct Candidate {
    value: Value,
    index: usize,
    row: Row,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.index == other.index
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value).then(self.index.cmp(&other.index))
    }
}

/// Keeps the `n` rows with the largest value in `column` per group.
///
/// Bounded to `O(n)` memory via a min-heap: once the heap holds `n`
/// candidates, a new row only replaces the current minimum when its value is
/// strictly greater, so among equal values the earliest arrival wins. Output
/// is ordered by descending value, ties broken by arrival order.
#[derive(Clone, Debug)]
pub struct TopN {
    pub column: String,
    pub n: usize,
}

impl TopN {
    #[must_use]
    pub fn new(column: impl Into<String>, n: usize) -> Self {
        Self {
            column: column.into(),
            n,
        }
    }
}

impl Reducer for TopN {
    fn reduce(&self, _keys: &[String], group: Vec<Row>) -> Result<Vec<Row>> {
        if self.n == 0 {
            return Ok(Vec::new());
        }
        let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(self.n);
        for (index, row) in group.into_iter().enumerate() {
            let value = row.get(&self.column)?.clone();
            if heap.len() < self.n {
                heap.push(Reverse(Candidate { value, index, row }));
            } else if let Some(Reverse(top)) = heap.peek() {
                if value > top.value {
                    heap.pop();
                    heap.push(Reverse(Candidate { value, index, row }));
                }
            }
        }
        let mut candidates: Vec<Candidate> = heap.into_iter().map(|Reverse(c)| c).collect();
        candidates.sort_by(|a, b| b.value.cmp(&a.value).then(a.index.cmp(&b.index)));
        Ok(candidates.into_iter().map(|c| c.row).collect())
    }
}
