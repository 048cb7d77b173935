//! Workbook decoding (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::error::{DecodeError, DecodeResult};
use crate::types::{Row, Value};

use super::header::{assemble_row, normalize_header};

/// Decode an in-memory workbook into rows.
///
/// Behavior:
/// - The container type is detected from the bytes, not from a filename
/// - Uses the first sheet in document order
/// - Detects the first non-empty row as the header row
/// - Every later non-blank row becomes one [`Row`], mapped onto the header by position
pub fn decode_workbook(bytes: &[u8]) -> DecodeResult<Vec<Row>> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheets = workbook.sheet_names();
    let sheet = first_sheet(&sheets)?;
    let range = workbook.worksheet_range(sheet)?;

    Ok(rows_from_range(&range))
}

fn first_sheet(sheets: &[String]) -> DecodeResult<&str> {
    sheets.first().map(String::as_str).ok_or(DecodeError::NoSheets)
}

fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    // A sheet with no cells at all has no header and no data.
    let header = match rows.next() {
        Some(cells) => normalize_header(cells.iter().map(cell_to_header_string)),
        None => return Vec::new(),
    };

    rows.filter_map(|cells| assemble_row(&header, cells.iter().map(cell_to_value)))
        .collect()
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

/// Keep the native cell type. Date cells stay numeric (their serial), as spreadsheet tools
/// report them when dates are not requested explicitly.
fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::DateTime(dt) => Value::Float64(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(e) => Value::Utf8(e.to_string()),
    }
}
