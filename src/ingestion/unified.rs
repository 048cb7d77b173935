//! Unified decoding entrypoint.
//!
//! - [`decode`] treats the bytes as a workbook container and detects its type from the content.
//! - [`decode_with`] honours [`DecodeOptions::format`], typically derived from the uploaded
//!   filename with [`UploadFormat::from_filename`].

use std::path::Path;

use crate::error::DecodeResult;
use crate::types::Row;

use super::{csv, workbook};

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Spreadsheet containers (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
    Workbook,
    /// Comma-separated values.
    Csv,
}

impl UploadFormat {
    /// Parse an upload format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }

    /// Infer the format from an uploaded filename. `None` if it has no recognised extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// Options controlling decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// If `None`, the bytes are decoded as a workbook with content-based detection.
    pub format: Option<UploadFormat>,
    /// Parse CSV fields into booleans/numbers instead of keeping them as text.
    pub infer_csv_scalars: bool,
}

/// Decode an uploaded spreadsheet into rows.
///
/// Equivalent to [`decode_with`] with default options.
///
/// ```no_run
/// use sheet_analytics::ingestion::decode;
/// use sheet_analytics::processing::summarize;
///
/// # fn main() -> Result<(), sheet_analytics::DecodeError> {
/// let bytes = std::fs::read("report.xlsx").unwrap_or_default();
/// let rows = decode(&bytes)?;
/// let summary = summarize(&rows);
/// println!("rows={} numeric_columns={}", rows.len(), summary.len());
/// # Ok(())
/// # }
/// ```
pub fn decode(bytes: &[u8]) -> DecodeResult<Vec<Row>> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decode an uploaded buffer using explicit [`DecodeOptions`].
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> DecodeResult<Vec<Row>> {
    match options.format {
        Some(UploadFormat::Csv) => csv::decode_csv(bytes, options.infer_csv_scalars),
        Some(UploadFormat::Workbook) | None => workbook::decode_workbook(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_with, DecodeOptions, UploadFormat};
    use crate::types::Value;

    #[test]
    fn format_from_filename_is_case_insensitive() {
        assert_eq!(UploadFormat::from_filename("Q3.XLSX"), Some(UploadFormat::Workbook));
        assert_eq!(UploadFormat::from_filename("sales.ods"), Some(UploadFormat::Workbook));
        assert_eq!(UploadFormat::from_filename("export.Csv"), Some(UploadFormat::Csv));
        assert_eq!(UploadFormat::from_filename("notes.txt"), None);
        assert_eq!(UploadFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn csv_format_routes_to_csv_decoder() {
        let opts = DecodeOptions {
            format: Some(UploadFormat::Csv),
            infer_csv_scalars: true,
        };
        let rows = decode_with(b"a,b\n1,x\n", &opts).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some(&Value::Int64(1)));
    }
}
