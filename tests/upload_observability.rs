use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::Workbook;

use sheet_analytics::auth::{Argon2Hasher, AuthConfig, JwtAuthority};
use sheet_analytics::error::{StoreError, StoreResult};
use sheet_analytics::model::{AccountId, RecordId, StoredUpload, UploadRecord};
use sheet_analytics::policy::Role;
use sheet_analytics::service::{
    AnalyticsService, CompositeObserver, FileObserver, Session, TracingObserver, UploadContext,
    UploadObserver, UploadOptions, UploadSeverity, UploadStats,
};
use sheet_analytics::store::{InMemoryStore, UploadStore};
use sheet_analytics::ServiceError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<UploadStats>>,
    failures: Mutex<Vec<UploadSeverity>>,
    alerts: Mutex<Vec<UploadSeverity>>,
}

impl UploadObserver for RecordingObserver {
    fn on_success(&self, _ctx: &UploadContext, stats: UploadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &UploadContext, severity: UploadSeverity, _error: &ServiceError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &UploadContext, severity: UploadSeverity, _error: &ServiceError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

struct UnavailableUploads;

impl UploadStore for UnavailableUploads {
    fn save_upload(&self, _record: UploadRecord) -> StoreResult<RecordId> {
        Err(StoreError::Unavailable {
            message: "disk full".to_string(),
        })
    }

    fn list_by_owner(&self, _owner: &AccountId) -> StoreResult<Vec<StoredUpload>> {
        Ok(Vec::new())
    }
}

fn session() -> Session {
    Session {
        account_id: AccountId::from("acc-1"),
        role: Some(Role::User),
    }
}

fn options(observer: Arc<dyn UploadObserver>) -> UploadOptions {
    UploadOptions {
        observer: Some(observer),
        alert_at_or_above: UploadSeverity::Critical,
        ..Default::default()
    }
}

fn service_with(uploads: Arc<dyn UploadStore>, opts: UploadOptions) -> AnalyticsService {
    let cfg = AuthConfig {
        secret: "s".to_string(),
        token_ttl: Duration::from_secs(60),
    };
    AnalyticsService::new(
        Arc::new(InMemoryStore::new()),
        uploads,
        Arc::new(Argon2Hasher),
        Arc::new(JwtAuthority::new(&cfg)),
        opts,
    )
}

fn small_xlsx() -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "n").unwrap();
    ws.write_string(0, 1, "label").unwrap();
    ws.write_number(1, 0, 1).unwrap();
    ws.write_string(1, 1, "a").unwrap();
    wb.save_to_buffer().unwrap()
}

#[test]
fn observer_receives_success_stats() {
    let obs = Arc::new(RecordingObserver::default());
    let svc = service_with(Arc::new(InMemoryStore::new()), options(obs.clone()));

    svc.upload(&session(), "small.xlsx", &small_xlsx()).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![UploadStats {
            rows: 1,
            numeric_columns: 1
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_without_alert_for_rejected_upload() {
    let obs = Arc::new(RecordingObserver::default());
    let svc = service_with(Arc::new(InMemoryStore::new()), options(obs.clone()));

    // Not a workbook -> Decode error -> Error severity (not Critical) -> no alert
    let _ = svc.upload(&session(), "bad.xlsx", b"not a workbook").unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_store_outage() {
    let obs = Arc::new(RecordingObserver::default());
    let svc = service_with(Arc::new(UnavailableUploads), options(obs.clone()));

    let err = svc.upload(&session(), "small.xlsx", &small_xlsx()).unwrap_err();
    assert_eq!(err.status_code(), 500);

    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![UploadSeverity::Critical]);
}

#[test]
fn forbidden_callers_are_not_reported() {
    let obs = Arc::new(RecordingObserver::default());
    let svc = service_with(Arc::new(InMemoryStore::new()), options(obs.clone()));
    let anonymous = Session {
        account_id: AccountId::from("acc-1"),
        role: None,
    };

    assert!(svc.upload(&anonymous, "small.xlsx", &small_xlsx()).is_err());
    assert!(obs.failures.lock().unwrap().is_empty());
    assert!(obs.successes.lock().unwrap().is_empty());
}

#[test]
fn composite_fans_out_to_file_and_tracing_observers() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let log = std::env::temp_dir().join(format!("sheet-analytics-uploads-{nanos}.log"));

    let recording = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn UploadObserver>> = vec![
        recording.clone() as Arc<dyn UploadObserver>,
        Arc::new(FileObserver::new(&log)),
        Arc::new(TracingObserver),
    ];
    let composite = Arc::new(CompositeObserver::new(observers));
    let svc = service_with(Arc::new(InMemoryStore::new()), options(composite));

    svc.upload(&session(), "small.xlsx", &small_xlsx()).unwrap();
    let _ = svc.upload(&session(), "bad.xlsx", b"junk");

    assert_eq!(recording.successes.lock().unwrap().len(), 1);
    assert_eq!(recording.failures.lock().unwrap().len(), 1);

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" ok owner=acc-1 file=small.xlsx"));
    assert!(lines[1].contains(" fail severity=Error owner=acc-1 file=bad.xlsx"));

    let _ = std::fs::remove_file(&log);
}
