//! In-memory computations over decoded rows.
//!
//! Currently implemented:
//!
//! - [`summarize()`]: per-column count/sum/average for numeric columns
//!
//! ## Example
//!
//! ```rust
//! use sheet_analytics::processing::summarize;
//! use sheet_analytics::types::{Row, Value};
//!
//! let rows = vec![
//!     Row::from_pairs([("a", Value::Int64(1)), ("b", Value::from("x"))]),
//!     Row::from_pairs([("a", Value::Int64(3)), ("b", Value::from("y"))]),
//! ];
//!
//! let summary = summarize(&rows);
//! let a = summary.get("a").unwrap();
//! assert_eq!((a.count, a.sum, a.average), (2, 4.0, 2.0));
//! // `b` never holds a number, so it is not summarized.
//! assert!(summary.get("b").is_none());
//! ```

pub mod summary;

pub use summary::{summarize, ColumnSummary, TableSummary};
