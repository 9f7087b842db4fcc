use async_trait::async_trait;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};

use super::TextNormalizer;
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedDocument,
};
use crate::domain::value_objects::DocumentType;

/// Word documents in the OOXML container. Legacy binary `.doc` files are
/// read with the same parser and fail as corrupted when they are not OOXML.
pub struct DocxExtractor {
    normalizer: TextNormalizer,
}

impl DocxExtractor {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    fn paragraphs(data: &[u8]) -> Result<Vec<String>, DocumentExtractionError> {
        let docx = docx_rs::read_docx(data)
            .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in docx.document.children {
            // Tables and section properties carry no body text we index.
            if let DocumentChild::Paragraph(paragraph) = child {
                let mut text = String::new();
                for child in paragraph.children {
                    if let ParagraphChild::Run(run) = child {
                        for child in run.children {
                            match child {
                                RunChild::Text(t) => text.push_str(&t.text),
                                RunChild::Tab(_) => text.push('\t'),
                                RunChild::Break(_) => text.push('\n'),
                                _ => {}
                            }
                        }
                    }
                }
                paragraphs.push(text);
            }
        }

        Ok(paragraphs)
    }
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
    async fn extract(
        &self,
        data: &[u8],
        document_type: DocumentType,
    ) -> Result<ExtractedDocument, DocumentExtractionError> {
        if !self.can_extract(document_type) {
            return Err(DocumentExtractionError::UnsupportedFormat(
                document_type.to_string(),
            ));
        }

        let paragraphs = Self::paragraphs(data)?;
        let text = self.normalizer.normalize(&paragraphs.join("\n\n"));

        Ok(ExtractedDocument::single(text))
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        matches!(document_type, DocumentType::Docx | DocumentType::Doc)
    }
}
