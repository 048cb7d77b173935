//! Per-column numeric summaries for decoded rows.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::types::Row;

/// Count, sum and average of the numeric values in one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Number of numeric occurrences.
    pub count: u64,
    /// Sum of the numeric occurrences, accumulated in row order.
    pub sum: f64,
    /// `sum / count`, or `0` when `count == 0`.
    pub average: f64,
}

impl ColumnSummary {
    /// Build a summary from a count and a sum, deriving the average.
    pub fn new(count: u64, sum: f64) -> Self {
        let average = if count > 0 { sum / count as f64 } else { 0.0 };
        Self { count, sum, average }
    }
}

/// Column name -> [`ColumnSummary`], for numeric columns only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSummary {
    columns: BTreeMap<String, ColumnSummary>,
}

impl TableSummary {
    /// Summary for `column`, if it was classified numeric.
    pub fn get(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns.get(column)
    }

    /// Number of numeric columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate `(column, summary)` pairs ordered by column name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ColumnSummary> {
        self.columns.iter()
    }
}

impl FromIterator<(String, ColumnSummary)> for TableSummary {
    fn from_iter<I: IntoIterator<Item = (String, ColumnSummary)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    sum: f64,
}

/// Summarize every numeric column in `rows`.
///
/// - Candidate columns are the distinct keys across all rows, not just the first one.
/// - A column is numeric if any non-missing occurrence is a number.
/// - Non-numeric occurrences in a numeric column are skipped, never coerced.
/// - Columns that are entirely text, boolean or empty are omitted.
///
/// Total over any input: `summarize(&[])` is an empty summary.
pub fn summarize(rows: &[Row]) -> TableSummary {
    let mut acc: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for row in rows {
        for (column, value) in row.iter() {
            if let Some(v) = value.as_f64() {
                let a = acc.entry(column).or_default();
                a.count += 1;
                a.sum += v;
            }
        }
    }

    acc.into_iter()
        .map(|(column, a)| (column.to_string(), ColumnSummary::new(a.count, a.sum)))
        .collect()
}
