//! Header normalization and positional row assembly shared by the workbook and CSV decoders.

use std::collections::HashSet;

use crate::types::{Row, Value};

/// Column name given to blank header cells.
pub const BLANK_HEADER: &str = "__EMPTY";

/// Turn raw header cells into unique column names.
///
/// - names are trimmed
/// - blank cells become `__EMPTY`, `__EMPTY_1`, ...
/// - repeated names get `_1`, `_2`, ... suffixes in order of appearance
pub fn normalize_header<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for cell in raw {
        let trimmed = cell.as_ref().trim();
        let base = if trimmed.is_empty() { BLANK_HEADER } else { trimmed };

        let mut name = base.to_string();
        let mut n = 0usize;
        while used.contains(&name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        used.insert(name.clone());
        out.push(name);
    }

    out
}

/// Map `values` onto `header` by position.
///
/// Missing trailing values are [`Value::Null`]; values past the header width are dropped.
/// Returns `None` when every value is null, so callers can skip blank rows.
pub fn assemble_row<I>(header: &[String], values: I) -> Option<Row>
where
    I: IntoIterator<Item = Value>,
{
    let mut values = values.into_iter();
    let mut row = Row::new();
    let mut any = false;

    for name in header {
        let v = values.next().unwrap_or(Value::Null);
        any |= !v.is_null();
        row.insert(name.as_str(), v);
    }

    any.then_some(row)
}
