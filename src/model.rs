//! Persisted shapes: upload records and accounts.
//!
//! These are plain data handed to the persistence collaborator. All of them serialize to
//! JSON-like structures with camelCase keys.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::Role;
use crate::processing::{summarize, TableSummary};
use crate::types::Row;

/// Opaque account identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

/// Opaque upload record identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_string())
    }
}

/// One successful upload: decoded rows, their summary, owner and upload time.
///
/// Fields are read-only once constructed; `uploaded_at` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    owner: AccountId,
    filename: String,
    uploaded_at: DateTime<Utc>,
    rows: Vec<Row>,
    summary: TableSummary,
}

impl UploadRecord {
    /// Assemble a record stamped with the current time.
    pub fn new(
        owner: AccountId,
        filename: impl Into<String>,
        rows: Vec<Row>,
        summary: TableSummary,
    ) -> Self {
        Self::with_timestamp(owner, filename, rows, summary, Utc::now())
    }

    /// Assemble a record with an explicit upload time.
    pub fn with_timestamp(
        owner: AccountId,
        filename: impl Into<String>,
        rows: Vec<Row>,
        summary: TableSummary,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner,
            filename: filename.into(),
            uploaded_at,
            rows,
            summary,
        }
    }

    /// Assemble a record, computing the summary from `rows`.
    pub fn from_rows(owner: AccountId, filename: impl Into<String>, rows: Vec<Row>) -> Self {
        let summary = summarize(&rows);
        Self::new(owner, filename, rows, summary)
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn summary(&self) -> &TableSummary {
        &self.summary
    }
}

/// An [`UploadRecord`] together with the id the store gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUpload {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: UploadRecord,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Account fields supplied on creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Account as shown to administrators: no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub username: String,
    pub role: Role,
}

impl From<&Account> for AccountView {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id.clone(),
            username: a.username.clone(),
            role: a.role,
        }
    }
}
