//! Integration tests for the Tally HTTP API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tally_domain::{FieldMap, FieldValue};
use tally_extractor::{Extractor, ExtractorConfig};
use tally_llm::MockProvider;
use tally_reconciler::{ReconcileConfig, ReconciliationService};
use tally_server::config::ServerConfig;
use tally_server::handlers::{create_router, AppState};
use tally_server::build_state;
use tally_store::MemoryRecordStore;
use tower::ServiceExt;

const BOUNDARY: &str = "tally-test-boundary";

const HEALTHINC_ANSWER: &str = r#"{
    "Company Name": "HealthInc",
    "Industry": "Healthcare",
    "Market Capitalization": 3000,
    "Equity (in millions)": 666
}"#;

fn healthinc_record() -> FieldMap {
    vec![
        ("Company Name", FieldValue::text("HealthInc")),
        ("Industry", FieldValue::text("Healthcare")),
        ("Market Capitalization", FieldValue::text("3,000")),
        ("Equity (in millions)", FieldValue::Integer(600)),
        ("Location", FieldValue::text("Boston")),
    ]
    .into_iter()
    .collect()
}

/// Single-page PDF, optionally with one line of text
fn build_pdf(line: Option<&str>) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => resources_id,
    };
    if let Some(line) = line {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        page.set("Contents", content_id);
    }
    let page_id = doc.add_object(page);

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn healthinc_pdf() -> Vec<u8> {
    build_pdf(Some("HealthInc annual report. Equity 666 million."))
}

fn app(provider: MockProvider, max_upload_bytes: usize) -> Router {
    let extractor = Extractor::new(provider, ExtractorConfig::default()).unwrap();
    let store = MemoryRecordStore::new().with_record("HealthInc", healthinc_record());
    let service = ReconciliationService::new(extractor, store, ReconcileConfig::default()).unwrap();

    create_router(AppState {
        service: Arc::new(service),
        model: "mock".to_string(),
        max_upload_bytes,
    })
}

fn healthinc_app() -> Router {
    app(MockProvider::new(HEALTHINC_ANSWER), 1024 * 1024)
}

fn upload(field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    write!(
        body,
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"filing.pdf\"\r\nContent-Type: {}\r\n\r\n",
        BOUNDARY, field, content_type
    )
    .unwrap();
    body.extend_from_slice(data);
    write!(body, "\r\n--{}--\r\n", BOUNDARY).unwrap();

    Request::builder()
        .method("POST")
        .uri("/upload_pdf/")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_root_greeting() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(healthinc_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Hello": "World"}));
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(healthinc_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["provider"], "mock");
}

#[tokio::test]
async fn test_upload_healthinc() {
    let (status, body) = send(healthinc_app(), upload("file", "application/pdf", &healthinc_pdf())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extracted_data"]["Company Name"], "HealthInc");
    assert_eq!(body["database_data"]["Location"], "Boston");

    let discrepancies = body["discrepancies"].as_object().unwrap();
    assert_eq!(discrepancies.len(), 1);
    assert_eq!(discrepancies["Equity (in millions)"]["extracted"], 666);
    assert_eq!(discrepancies["Equity (in millions)"]["canonical"], 600);
}

#[tokio::test]
async fn test_upload_without_trailing_slash() {
    let mut request = upload("file", "application/pdf", &healthinc_pdf());
    *request.uri_mut() = "/upload_pdf".parse().unwrap();

    let (status, _) = send(healthinc_app(), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_wrong_content_type() {
    let (status, body) = send(healthinc_app(), upload("file", "text/plain", b"hello")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid file type");
    assert_eq!(body["kind"], "unsupported_format");
}

#[tokio::test]
async fn test_upload_fake_pdf() {
    let (status, body) =
        send(healthinc_app(), upload("file", "application/pdf", b"not really a pdf")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid file type");
}

#[tokio::test]
async fn test_upload_missing_file_field() {
    let (status, body) =
        send(healthinc_app(), upload("attachment", "application/pdf", &healthinc_pdf())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "malformed_input");
}

#[tokio::test]
async fn test_upload_unknown_company() {
    let provider = MockProvider::new(r#"{"Company Name": "WealthInc", "Equity (in millions)": 10}"#);
    let (status, body) =
        send(app(provider, 1024 * 1024), upload("file", "application/pdf", &healthinc_pdf())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "record_not_found");
    assert!(body["detail"].as_str().unwrap().contains("WealthInc"));
}

#[tokio::test]
async fn test_upload_provider_failure() {
    let (status, body) = send(
        app(MockProvider::failing(), 1024 * 1024),
        upload("file", "application/pdf", &healthinc_pdf()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "extraction_failed");
}

#[tokio::test]
async fn test_upload_pdf_without_text() {
    let (status, body) =
        send(healthinc_app(), upload("file", "application/pdf", &build_pdf(None))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "extraction_failed");
}

#[tokio::test]
async fn test_upload_too_large() {
    let big = healthinc_pdf();
    let (status, _) = send(
        app(MockProvider::new(HEALTHINC_ANSWER), 64),
        upload("file", "application/pdf", &big),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_reconcile_endpoint() {
    let request_body = json!({
        "extracted": {
            "Company Name": "HealthInc",
            "Revenue (in millions)": "$1,000",
            "Equity (in millions)": 666,
            "CEO": null
        },
        "canonical": {
            "Company Name": "healthinc",
            "Revenue (in millions)": 1000,
            "Equity (in millions)": 600
        }
    });
    let request = Request::builder()
        .method("POST")
        .uri("/reconcile")
        .header("content-type", "application/json")
        .body(Body::from(request_body.to_string()))
        .unwrap();

    let (status, body) = send(healthinc_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let discrepancies = body["discrepancies"].as_object().unwrap();
    assert_eq!(discrepancies.len(), 1);
    assert_eq!(discrepancies["Equity (in millions)"]["extracted"], 666);
    assert_eq!(discrepancies["Equity (in millions)"]["canonical"], 600);
}

#[tokio::test]
async fn test_reconcile_rejects_nested_values() {
    let request_body = json!({
        "extracted": {"Officers": {"CEO": "Jane Roe"}},
        "canonical": {}
    });
    let request = Request::builder()
        .method("POST")
        .uri("/reconcile")
        .header("content-type", "application/json")
        .body(Body::from(request_body.to_string()))
        .unwrap();

    let (status, body) = send(healthinc_app(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("Officers"));
}

#[tokio::test]
async fn test_build_state_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("records.csv");
    std::fs::write(&csv_path, "Company Name,Equity (in millions)\nHealthInc,600\n").unwrap();

    let toml = format!(
        r#"
        [store]
        path = "{}"

        [provider]
        model = "mistral"
        "#,
        csv_path.display()
    );
    let config = ServerConfig::from_toml(&toml).unwrap();
    let state = build_state(&config).unwrap();

    assert_eq!(state.model, "mistral");
    assert_eq!(
        tally_domain::traits::RecordLookup::name(state.service.lookup()),
        "csv:records.csv"
    );
}
