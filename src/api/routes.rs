use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::batch::{into_findings, BatchEvaluator, BatchStats, Evaluated};
use crate::domain::{DocumentId, ProcessRecord};
use crate::ingest::{parse_sheet, parse_workbook, IngestError};
use crate::observability::{MetricsRegistry, TimingGuard};
use crate::policy::{ConfigError, ConfigLoader};
use crate::report::{summarize, SummarySpec};
use crate::rules::RuleConfig;
use crate::storage::{FindingsBatch, FindingsStore};

use super::request::{FindingsQuery, ImportParams, ImportRequest};
use super::response::{
    ErrorResponse, FindingsReport, HealthResponse, ImportResponse, ReadyResponse,
};

/// Shared application state.
pub struct AppState {
    /// Keyed store of import results
    pub store: Arc<dyn FindingsStore>,

    /// Rule config location, read once per import
    pub loader: ConfigLoader,

    /// Sequential/parallel batch selection
    pub evaluator: BatchEvaluator,

    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/import", post(handle_import_json))
        .route("/v1/import/csv", post(handle_import_csv))
        .route("/v1/import/xlsx", post(handle_import_xlsx))
        .route("/v1/findings", get(handle_findings))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .with_state(state)
}

/// Import rows sent as JSON objects.
async fn handle_import_json(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportRequest>,
) -> Response {
    run_import(&state, req.name, &req.cpf_cnpj, req.rows).await
}

/// Import a raw CSV sheet.
async fn handle_import_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> Response {
    import_upload(&state, params, parse_sheet(&body)).await
}

/// Import the first sheet of an Excel/ODS workbook.
async fn handle_import_xlsx(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> Response {
    import_upload(&state, params, parse_workbook(&body)).await
}

async fn import_upload(
    state: &AppState,
    params: ImportParams,
    parsed: Result<Vec<ProcessRecord>, IngestError>,
) -> Response {
    let rows = match parsed {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "Rejected unreadable sheet");
            state.metrics.record_import_error();
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!("Failed to read sheet: {e}"))),
            )
                .into_response();
        }
    };

    run_import(state, params.name, &params.cpf_cnpj, rows).await
}

/// Load the rules, evaluate the batch and store what was included.
async fn run_import(
    state: &AppState,
    name: String,
    raw_document: &str,
    rows: Vec<ProcessRecord>,
) -> Response {
    let _timer = TimingGuard::new(&state.metrics);

    let document = DocumentId::new(raw_document);
    if document.as_str().is_empty() {
        state.metrics.record_import_error();
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("cpf_cnpj must contain digits")),
        )
            .into_response();
    }

    info!(
        document = %document,
        kind = %document.kind(),
        rows = rows.len(),
        "Import received"
    );

    let loader = state.loader.clone();
    let evaluator = state.evaluator;
    let outcome = tokio::task::spawn_blocking(
        move || -> Result<(Vec<Evaluated>, SummarySpec), ConfigError> {
            let config = loader.load()?;
            Ok((evaluator.evaluate(rows, &config), SummarySpec::for_config(&config)))
        },
    )
    .await;

    let (evaluated, summary_spec) = match outcome {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            error!(document = %document, error = %e, "Failed to load rule config");
            state.metrics.record_config_error();
            state.metrics.record_import_error();
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::config_error(format!(
                    "Failed to process the file: {e}"
                ))),
            )
                .into_response();
        }
        Err(e) => {
            error!(document = %document, error = %e, "Batch evaluation task failed");
            state.metrics.record_import_error();
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("Batch evaluation failed")),
            )
                .into_response();
        }
    };

    let stats = BatchStats::from_evaluated(&evaluated);
    let findings = into_findings(evaluated);
    let batch = FindingsBatch {
        document: document.clone(),
        name: name.clone(),
        imported_at: Utc::now(),
        stats,
        summary: summarize(&findings, &summary_spec),
        findings,
    };

    if let Err(e) = state.store.put_findings(batch).await {
        error!(document = %document, error = %e, "Failed to store findings");
        state.metrics.record_import_error();
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error("Failed to store findings")),
        )
            .into_response();
    }

    state.metrics.record_import(&stats);

    info!(
        document = %document,
        evaluated = stats.evaluated,
        included = stats.included,
        excluded_by_status = stats.excluded_by_status,
        "Import completed"
    );

    (
        StatusCode::OK,
        Json(ImportResponse::new(document, &name, stats)),
    )
        .into_response()
}

/// Findings report for a document.
async fn handle_findings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FindingsQuery>,
) -> Response {
    state.metrics.record_findings_request();
    let document = DocumentId::new(&query.cpf_cnpj);

    match state.store.get_findings(&document).await {
        Ok(Some(batch)) => (
            StatusCode::OK,
            Json(FindingsReport {
                cpf_cnpj: batch.document,
                name: Some(batch.name),
                imported_at: Some(batch.imported_at),
                total: batch.findings.len(),
                summary: batch.summary,
                findings: batch.findings,
            }),
        )
            .into_response(),
        Ok(None) => (StatusCode::OK, Json(FindingsReport::empty(document))).into_response(),
        Err(e) => {
            error!(document = %document, error = %e, "Failed to read findings");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("Failed to read findings")),
            )
                .into_response()
        }
    }
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let documents = state.store.document_count().await.unwrap_or_default();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        documents,
    })
}

/// Readiness check endpoint.
///
/// Ready only while the rule config loads cleanly.
async fn handle_ready(State(state): State<Arc<AppState>>) -> Response {
    let loader = state.loader.clone();
    let loaded: Result<Result<RuleConfig, ConfigError>, _> =
        tokio::task::spawn_blocking(move || loader.load()).await;

    match loaded {
        Ok(Ok(config)) => (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                rules_path: state.loader.path().display().to_string(),
                inclusion_rules: config.inclusion_rules.len(),
                excluded_statuses: config.excluded_statuses.len(),
            }),
        )
            .into_response(),
        Ok(Err(e)) => {
            state.metrics.record_config_error();
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(e.to_string(), "NOT_READY")),
            )
                .into_response()
        }
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Config check failed", "NOT_READY")),
        )
            .into_response(),
    }
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = format!(
        r#"# HELP casescreen_uptime_seconds Application uptime in seconds
# TYPE casescreen_uptime_seconds counter
casescreen_uptime_seconds {}

{}"#,
        state.start_time.elapsed().as_secs(),
        state.metrics.to_prometheus(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        metrics,
    )
}
