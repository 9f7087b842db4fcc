use async_trait::async_trait;

use crate::domain::value_objects::DocumentType;

#[derive(Debug)]
pub enum DocumentExtractionError {
    UnsupportedFormat(String),
    CorruptedFile(String),
    ExtractionFailed(String),
}

impl std::fmt::Display for DocumentExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentExtractionError::UnsupportedFormat(format) => {
                write!(f, "Unsupported format: {}", format)
            }
            DocumentExtractionError::CorruptedFile(msg) => write!(f, "Corrupted file: {}", msg),
            DocumentExtractionError::ExtractionFailed(msg) => {
                write!(f, "Extraction failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for DocumentExtractionError {}

/// Text of one page. Formats without pagination produce a single page with
/// no number.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub page_number: Option<u32>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub pages: Vec<ExtractedPage>,
    pub title: Option<String>,
}

impl ExtractedDocument {
    pub fn single(text: String) -> Self {
        Self {
            pages: vec![ExtractedPage {
                page_number: None,
                text,
            }],
            title: None,
        }
    }

    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|page| !page.text.trim().is_empty())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(
        &self,
        data: &[u8],
        document_type: DocumentType,
    ) -> Result<ExtractedDocument, DocumentExtractionError>;

    fn can_extract(&self, document_type: DocumentType) -> bool;
}
