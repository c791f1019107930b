//! The pipeline's log lines carry document hashes and counts, never the
//! company a filing names.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tally_domain::{DocumentRef, FieldMap, FieldValue};
use tally_extractor::{Extractor, ExtractorConfig};
use tally_llm::MockProvider;
use tally_reconciler::{ReconcileConfig, ReconciliationService};
use tally_store::MemoryRecordStore;

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

fn service(answer: &str) -> ReconciliationService<Extractor<MockProvider>, MemoryRecordStore> {
    let record: FieldMap = vec![
        ("Company Name", FieldValue::text("HealthInc")),
        ("Equity (in millions)", FieldValue::Integer(600)),
    ]
    .into_iter()
    .collect();
    let extractor = Extractor::new(MockProvider::new(answer), ExtractorConfig::default()).unwrap();
    let store = MemoryRecordStore::new().with_record("HealthInc", record);
    ReconciliationService::new(extractor, store, ReconcileConfig::default()).unwrap()
}

fn filing() -> DocumentRef {
    DocumentRef::bytes(Some("annual-report.txt".to_string()), b"Annual report.".to_vec())
}

#[tokio::test]
async fn test_reconciled_document_logs_hash_not_company() {
    let (logs, _guard) = capture();
    let service = service(r#"{"Company Name": "HealthInc", "Equity (in millions)": 666}"#);

    let outcome = service.reconcile_document(&filing()).await.unwrap();

    let logs = logs.contents();
    assert!(logs.contains(outcome.extraction.document().short()));
    assert!(logs.contains("1 of 2 fields differ"));
    assert!(!logs.contains("HealthInc"));
}

#[tokio::test]
async fn test_unknown_company_is_not_logged() {
    let (logs, _guard) = capture();
    let service = service(r#"{"Company Name": "WealthInc", "Equity (in millions)": 150}"#);

    assert!(service.reconcile_document(&filing()).await.is_err());

    let logs = logs.contents();
    assert!(logs.contains("not on file"));
    assert!(!logs.contains("WealthInc"));
}
