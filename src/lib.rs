//! `sheet-analytics` turns spreadsheet uploads into typed rows and per-column numeric summaries,
//! stores them per account, and gates access by role.
//!
//! The core is four pure pieces:
//!
//! - [`ingestion::decode`]: raw workbook bytes -> `Vec<`[`types::Row`]`>`
//! - [`processing::summarize`]: rows -> [`processing::TableSummary`] (count/sum/average)
//! - [`model::UploadRecord`]: rows + summary + owner + immutable upload time
//! - [`policy::authorize`]: role-based allow/deny
//!
//! Around it, [`service::AnalyticsService`] wires those pieces to injected collaborators
//! ([`store`], [`auth`]) the way a route layer would call them.
//!
//! ## What you can upload
//!
//! - **Workbooks** (detected from the bytes): `.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`
//! - **CSV** when the filename ends in `.csv` (or the format is forced via
//!   [`ingestion::DecodeOptions`])
//!
//! The first sheet is used; its first non-empty row is the header. Cells keep their native
//! type ([`types::Value::Int64`], [`types::Value::Float64`], [`types::Value::Bool`],
//! [`types::Value::Utf8`]); blanks are [`types::Value::Null`].
//!
//! ## Summaries
//!
//! A column is summarized when any row holds a number in it. Text, boolean and empty
//! occurrences are skipped, never coerced. `average` is `sum / count`, and `0` when
//! `count == 0`.
//!
//! ```rust
//! use sheet_analytics::processing::summarize;
//! use sheet_analytics::types::{Row, Value};
//!
//! let rows = vec![
//!     Row::from_pairs([("a", Value::Int64(1))]),
//!     Row::from_pairs([("a", Value::from("oops"))]),
//!     Row::from_pairs([("a", Value::Int64(5))]),
//! ];
//! let a = *summarize(&rows).get("a").unwrap();
//! assert_eq!((a.count, a.sum, a.average), (2, 6.0, 3.0));
//! ```
//!
//! ## Access policy
//!
//! ```rust
//! use sheet_analytics::policy::{authorize, Decision, Role};
//!
//! assert_eq!(authorize(Some(Role::User), Role::Admin), Decision::Deny);
//! assert_eq!(authorize(Some(Role::Admin), Role::Admin), Decision::Allow);
//! assert_eq!(authorize(None, Role::User), Decision::Deny);
//! ```
//!
//! ## Service example
//!
//! ```no_run
//! use sheet_analytics::auth::AuthConfig;
//! use sheet_analytics::service::{AnalyticsService, UploadOptions};
//!
//! # fn main() -> Result<(), sheet_analytics::ServiceError> {
//! let svc = AnalyticsService::in_memory(&AuthConfig::from_env(), UploadOptions::default());
//! svc.register("ada", "correct horse")?;
//! let login = svc.login("ada", "correct horse")?;
//!
//! let header = format!("Bearer {}", login.token);
//! let session = svc.authenticate(Some(&header))?;
//! let bytes = std::fs::read("q3.xlsx").unwrap_or_default();
//! let receipt = svc.upload(&session, "q3.xlsx", &bytes)?;
//! println!("rows={} numeric_columns={}", receipt.row_count, receipt.summary.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: decoding entrypoints and format-specific decoders
//! - [`processing`]: column summaries
//! - [`types`]: row and value types
//! - [`model`]: persisted record and account shapes
//! - [`policy`]: roles and access decisions
//! - [`store`]: persistence traits and an in-memory store
//! - [`auth`]: hashing/token traits with argon2 and JWT implementations
//! - [`service`]: the application service and upload observers
//! - [`error`]: error types

pub mod auth;
pub mod error;
pub mod ingestion;
pub mod model;
pub mod policy;
pub mod processing;
pub mod service;
pub mod store;
pub mod types;

pub use error::{DecodeError, DecodeResult, ServiceError, ServiceResult};
