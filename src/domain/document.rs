use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of Brazilian taxpayer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    /// Individual (11 digits)
    Cpf,
    /// Company (14 digits)
    Cnpj,
    /// Anything else
    Unknown,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Cpf => write!(f, "CPF"),
            DocumentKind::Cnpj => write!(f, "CNPJ"),
            DocumentKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// CPF/CNPJ with punctuation stripped, used to key stored findings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Clean a user-supplied document, keeping only ASCII digits.
    pub fn new(raw: &str) -> Self {
        DocumentId(raw.chars().filter(|c| c.is_ascii_digit()).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> DocumentKind {
        match self.0.len() {
            11 => DocumentKind::Cpf,
            14 => DocumentKind::Cnpj,
            _ => DocumentKind::Unknown,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
