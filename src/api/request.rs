use serde::{Deserialize, Serialize};

use crate::domain::ProcessRecord;

/// JSON import: sheet rows already decoded by the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Display name of the person or company screened
    #[serde(default)]
    pub name: String,

    /// CPF/CNPJ, punctuation allowed
    pub cpf_cnpj: String,

    /// One object per sheet row
    #[serde(default)]
    pub rows: Vec<ProcessRecord>,
}

/// Query string of a CSV or workbook upload.
#[derive(Debug, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub name: String,

    pub cpf_cnpj: String,
}

/// Query string of a findings lookup.
#[derive(Debug, Deserialize)]
pub struct FindingsQuery {
    pub cpf_cnpj: String,
}
