use serde::{Deserialize, Serialize};
use std::path::Path;

/// File formats accepted by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Pdf,
        DocumentType::Docx,
        DocumentType::Doc,
        DocumentType::Txt,
    ];

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?;
        Self::from_extension(extension)
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(DocumentType::Pdf),
            "docx" => Some(DocumentType::Docx),
            "doc" => Some(DocumentType::Doc),
            "txt" => Some(DocumentType::Txt),
            _ => None,
        }
    }

    /// Extension with the leading dot, as recorded in chunk metadata.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentType::Pdf => ".pdf",
            DocumentType::Docx => ".docx",
            DocumentType::Doc => ".doc",
            DocumentType::Txt => ".txt",
        }
    }

    pub fn allowed_extensions() -> String {
        Self::ALL
            .iter()
            .map(|t| t.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}
