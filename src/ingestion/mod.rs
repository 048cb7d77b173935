//! Decoding entrypoints and implementations.
//!
//! Most callers should use [`decode`] (from [`unified`]), which auto-detects the workbook
//! container from the bytes, or [`decode_with`] to force a format via [`DecodeOptions`].
//!
//! Format-specific functions are also available under:
//! - [`workbook`]
//! - [`csv`]

pub mod csv;
pub mod header;
pub mod unified;
pub mod workbook;

pub use unified::{decode, decode_with, DecodeOptions, UploadFormat};
