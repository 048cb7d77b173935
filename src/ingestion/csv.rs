//! CSV decoding.

use crate::error::{DecodeError, DecodeResult};
use crate::types::{Row, Value};

use super::header::{assemble_row, normalize_header};

/// Decode an in-memory CSV upload into rows.
///
/// Rules:
///
/// - The first record is the header.
/// - Records may be shorter than the header; missing trailing fields are [`Value::Null`].
/// - Empty fields are [`Value::Null`].
/// - CSV carries no cell types, so fields are text unless `infer_scalars` is set, in which case
///   `true`/`false`, integers and decimals are parsed into their scalar types.
pub fn decode_csv(bytes: &[u8], infer_scalars: bool) -> DecodeResult<Vec<Row>> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    decode_csv_from_reader(&mut rdr, infer_scalars)
}

/// Decode CSV data from an existing CSV reader.
pub fn decode_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    infer_scalars: bool,
) -> DecodeResult<Vec<Row>> {
    let header = normalize_header(rdr.headers()?.iter());

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let values = record.iter().map(|raw| parse_field(raw, infer_scalars));
        if let Some(row) = assemble_row(&header, values) {
            rows.push(row);
        }
    }

    Ok(rows)
}

fn parse_field(raw: &str, infer_scalars: bool) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if !infer_scalars {
        return Value::Utf8(raw.to_owned());
    }

    if let Some(b) = parse_bool(trimmed) {
        Value::Bool(b)
    } else if let Ok(i) = trimmed.parse::<i64>() {
        Value::Int64(i)
    } else {
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float64(f),
            _ => Value::Utf8(raw.to_owned()),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_field;
    use crate::types::Value;

    #[test]
    fn fields_stay_text_without_inference() {
        assert_eq!(parse_field("42", false), Value::Utf8("42".to_string()));
        assert_eq!(parse_field("  ", false), Value::Null);
    }

    #[test]
    fn inference_recognizes_scalars() {
        assert_eq!(parse_field("42", true), Value::Int64(42));
        assert_eq!(parse_field(" 2.5 ", true), Value::Float64(2.5));
        assert_eq!(parse_field("TRUE", true), Value::Bool(true));
        assert_eq!(parse_field("yes", true), Value::Utf8("yes".to_string()));
        assert_eq!(parse_field("inf", true), Value::Utf8("inf".to_string()));
    }
}
