//! HTTP handlers for the reconciliation API

use crate::conversions::{json_to_fields, outcome_to_json, report_to_json};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tally_domain::traits::{FieldExtractor, RecordLookup};
use tally_domain::{Classified, DocumentRef, ErrorKind};
use tally_extractor::DocumentFormat;
use tally_reconciler::{ReconcileError, ReconciliationService};
use tracing::{debug, error, info};

/// Multipart field carrying the uploaded filing
const UPLOAD_FIELD: &str = "file";

/// Shared application state
pub struct AppState<E, L> {
    /// Reconciliation pipeline
    pub service: Arc<ReconciliationService<E, L>>,
    /// Model name reported by `/health`
    pub model: String,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl<E, L> Clone for AppState<E, L> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            model: self.model.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub detail: String,
    /// Taxonomy code, when the failure has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Body of `POST /reconcile`
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    /// Fields as extracted
    pub extracted: Map<String, Value>,
    /// Fields on record
    #[serde(default)]
    pub canonical: Map<String, Value>,
}

/// Application error type
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    kind: Option<ErrorKind>,
    detail: String,
}

impl AppError {
    /// An error of a taxonomy kind
    pub fn from_kind(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            status: status_for(kind),
            kind: Some(kind),
            detail: detail.into(),
        }
    }

    fn rejected(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            kind: None,
            detail: detail.into(),
        }
    }
}

/// HTTP status for a taxonomy kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::DocumentNotFound | ErrorKind::RecordNotFound => StatusCode::NOT_FOUND,
        ErrorKind::UnsupportedFormat => StatusCode::BAD_REQUEST,
        ErrorKind::MalformedInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ExtractionFailed => StatusCode::BAD_GATEWAY,
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<ReconcileError> for AppError {
    fn from(e: ReconcileError) -> Self {
        let kind = e.kind();
        let detail = match kind {
            ErrorKind::DocumentNotFound => "File not found".to_string(),
            ErrorKind::UnsupportedFormat => "Invalid file type".to_string(),
            _ => e.to_string(),
        };
        AppError::from_kind(kind, detail)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed ({}): {}", self.status, self.detail);
        } else {
            debug!(
                "Request rejected ({}): {}",
                self.status,
                self.kind.map(|k| k.code()).unwrap_or("invalid_request")
            );
        }

        let body = Json(ErrorResponse {
            detail: self.detail,
            kind: self.kind.map(|k| k.code().to_string()),
        });
        (self.status, body).into_response()
    }
}

/// Whether a multipart content type names a PDF
fn is_pdf_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false)
}

/// GET / - Liveness greeting
async fn root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

/// GET /health - Store and model in use
async fn health<E, L>(State(state): State<AppState<E, L>>) -> Json<Value>
where
    E: FieldExtractor + Send + Sync + 'static,
    L: RecordLookup + Send + Sync + 'static,
{
    Json(json!({
        "status": "healthy",
        "store": state.service.lookup().name(),
        "provider": state.model,
    }))
}

/// POST /upload_pdf/ - Reconcile an uploaded filing
///
/// Expects a multipart form with the PDF under `file`. Responds with the
/// extracted fields, the record on file and the discrepancies between them.
async fn upload_pdf<E, L>(
    State(state): State<AppState<E, L>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError>
where
    E: FieldExtractor + Send + Sync + 'static,
    L: RecordLookup + Send + Sync + 'static,
{
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::rejected(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if !is_pdf_content_type(field.content_type().unwrap_or_default()) {
            return Err(AppError::from_kind(
                ErrorKind::UnsupportedFormat,
                "Invalid file type",
            ));
        }
        let name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;
        upload = Some((name, data));
        break;
    }

    let (name, data) = upload.ok_or_else(|| {
        AppError::from_kind(
            ErrorKind::MalformedInput,
            format!("Missing '{}' field", UPLOAD_FIELD),
        )
    })?;

    // The declared type is only a claim; the bytes must agree
    if DocumentFormat::sniff(&data) != Some(DocumentFormat::Pdf) {
        return Err(AppError::from_kind(
            ErrorKind::UnsupportedFormat,
            "Invalid file type",
        ));
    }

    info!("Received upload ({} bytes)", data.len());

    let document = DocumentRef::bytes(name, data.to_vec());
    let outcome = state.service.reconcile_document(&document).await?;
    Ok(Json(outcome_to_json(&outcome)))
}

/// POST /reconcile - Compare two supplied field maps
async fn reconcile_fields<E, L>(
    State(state): State<AppState<E, L>>,
    Json(request): Json<ReconcileRequest>,
) -> Result<Json<Value>, AppError>
where
    E: FieldExtractor + Send + Sync + 'static,
    L: RecordLookup + Send + Sync + 'static,
{
    let extracted = json_to_fields(&request.extracted)
        .map_err(|d| AppError::from_kind(ErrorKind::MalformedInput, d))?;
    let canonical = json_to_fields(&request.canonical)
        .map_err(|d| AppError::from_kind(ErrorKind::MalformedInput, d))?;

    let report = state.service.engine().reconcile(&extracted, &canonical);
    Ok(Json(json!({ "discrepancies": report_to_json(&report) })))
}

/// Create the axum router with all routes
pub fn create_router<E, L>(state: AppState<E, L>) -> AxumRouter
where
    E: FieldExtractor + Send + Sync + 'static,
    L: RecordLookup + Send + Sync + 'static,
{
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    AxumRouter::new()
        .route("/", get(root))
        .route("/health", get(health::<E, L>))
        .route("/upload_pdf", post(upload_pdf::<E, L>))
        .route("/upload_pdf/", post(upload_pdf::<E, L>))
        .route("/reconcile", post(reconcile_fields::<E, L>))
        .layer(body_limit)
        .with_state(state)
}
