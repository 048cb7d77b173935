use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ServiceError;
use crate::ingestion::UploadFormat;
use crate::model::AccountId;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the upload was rejected).
    Error,
    /// Critical error (store or credential infrastructure failures).
    Critical,
}

/// Context about an upload attempt.
#[derive(Debug, Clone)]
pub struct UploadContext {
    /// Account that sent the upload.
    pub owner: AccountId,
    /// Filename as supplied by the client.
    pub filename: String,
    /// Format used for decoding; `None` means workbook auto-detection.
    pub format: Option<UploadFormat>,
}

/// Minimal stats reported on a stored upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Number of decoded rows.
    pub rows: usize,
    /// Number of columns that made it into the summary.
    pub numeric_columns: usize,
}

/// Observer interface for upload outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait UploadObserver: Send + Sync {
    /// Called when an upload is decoded and stored.
    fn on_success(&self, _ctx: &UploadContext, _stats: UploadStats) {}

    /// Called when an upload fails.
    fn on_failure(&self, _ctx: &UploadContext, _severity: UploadSeverity, _error: &ServiceError) {}

    /// Called when an upload failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Map a failed upload to a severity.
pub fn severity_for_error(e: &ServiceError) -> UploadSeverity {
    match e {
        ServiceError::Store(_) | ServiceError::Auth(_) => UploadSeverity::Critical,
        _ => UploadSeverity::Error,
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn UploadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn UploadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl UploadObserver for CompositeObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs upload events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl UploadObserver for StdErrObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        eprintln!(
            "[upload][ok] owner={} file={} format={:?} rows={} numeric_columns={}",
            ctx.owner, ctx.filename, ctx.format, stats.rows, stats.numeric_columns
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        eprintln!(
            "[upload][{:?}] owner={} file={} format={:?} err={}",
            severity, ctx.owner, ctx.filename, ctx.format, error
        );
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        eprintln!(
            "[ALERT][upload][{:?}] owner={} file={} format={:?} err={}",
            severity, ctx.owner, ctx.filename, ctx.format, error
        );
    }
}

/// Emits upload events through `tracing`. Installing a subscriber is up to the binary.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl UploadObserver for TracingObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        tracing::info!(
            owner = %ctx.owner,
            filename = %ctx.filename,
            format = ?ctx.format,
            rows = stats.rows,
            numeric_columns = stats.numeric_columns,
            "upload stored"
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        match severity {
            UploadSeverity::Info => {
                tracing::info!(owner = %ctx.owner, filename = %ctx.filename, %error, "upload failed")
            }
            UploadSeverity::Warning | UploadSeverity::Error => {
                tracing::warn!(owner = %ctx.owner, filename = %ctx.filename, ?severity, %error, "upload failed")
            }
            UploadSeverity::Critical => {
                tracing::error!(owner = %ctx.owner, filename = %ctx.filename, ?severity, %error, "upload failed")
            }
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        tracing::error!(
            alert = true,
            owner = %ctx.owner,
            filename = %ctx.filename,
            ?severity,
            %error,
            "upload alert"
        );
    }
}

/// Appends upload events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl UploadObserver for FileObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        self.append_line(&format!(
            "{} ok owner={} file={} format={:?} rows={} numeric_columns={}",
            unix_ts(),
            ctx.owner,
            ctx.filename,
            ctx.format,
            stats.rows,
            stats.numeric_columns
        ));
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        self.append_line(&format!(
            "{} fail severity={:?} owner={} file={} format={:?} err={}",
            unix_ts(),
            severity,
            ctx.owner,
            ctx.filename,
            ctx.format,
            error
        ));
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &ServiceError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} owner={} file={} format={:?} err={}",
            unix_ts(),
            severity,
            ctx.owner,
            ctx.filename,
            ctx.format,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::{severity_for_error, UploadSeverity};
    use crate::error::{AuthError, DecodeError, ServiceError, StoreError};

    #[test]
    fn infrastructure_failures_are_critical() {
        let store = ServiceError::from(StoreError::Unavailable {
            message: "down".to_string(),
        });
        let auth = ServiceError::from(AuthError::Hash {
            message: "bad".to_string(),
        });
        assert_eq!(severity_for_error(&store), UploadSeverity::Critical);
        assert_eq!(severity_for_error(&auth), UploadSeverity::Critical);
    }

    #[test]
    fn rejected_uploads_are_errors() {
        let decode = ServiceError::from(DecodeError::NoSheets);
        assert_eq!(severity_for_error(&decode), UploadSeverity::Error);
    }
}
