use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::batch::{BatchStats, Finding};
use crate::domain::{DocumentId, DocumentKind};
use crate::report::SummaryRow;

/// Response to a completed import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub ok: bool,
    pub message: String,
    pub cpf_cnpj: DocumentId,
    pub document_kind: DocumentKind,
    pub evaluated: usize,
    pub included: usize,
    pub excluded_by_status: usize,
}

impl ImportResponse {
    pub fn new(document: DocumentId, name: &str, stats: BatchStats) -> Self {
        ImportResponse {
            ok: true,
            message: format!(
                "Analysis complete. {} findings found for {}.",
                stats.included, name
            ),
            document_kind: document.kind(),
            cpf_cnpj: document,
            evaluated: stats.evaluated,
            included: stats.included,
            excluded_by_status: stats.excluded_by_status,
        }
    }
}

/// Findings report for one document.
#[derive(Debug, Serialize)]
pub struct FindingsReport {
    pub cpf_cnpj: DocumentId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,

    pub total: usize,
    pub summary: Vec<SummaryRow>,
    pub findings: Vec<Finding>,
}

impl FindingsReport {
    /// Report for a document nothing was imported for.
    pub fn empty(document: DocumentId) -> Self {
        FindingsReport {
            cpf_cnpj: document,
            name: None,
            imported_at: None,
            total: 0,
            summary: Vec::new(),
            findings: Vec::new(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub documents: usize,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub rules_path: String,
    pub inclusion_rules: usize,
    pub excluded_statuses: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "BAD_REQUEST")
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "CONFIG_ERROR")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "INTERNAL_ERROR")
    }
}
