use async_trait::async_trait;
use std::sync::Arc;

use super::{DocxExtractor, PdfExtractor, TextExtractor, TextNormalizer};
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedDocument,
};
use crate::domain::value_objects::DocumentType;

/// Routes each upload to the extractor for its format.
pub struct CompositeDocumentExtractor {
    pdf_extractor: Arc<PdfExtractor>,
    docx_extractor: Arc<DocxExtractor>,
    text_extractor: Arc<TextExtractor>,
}

impl CompositeDocumentExtractor {
    pub fn new() -> Result<Self, DocumentExtractionError> {
        let normalizer = TextNormalizer::new()?;

        Ok(Self {
            pdf_extractor: Arc::new(PdfExtractor::new(normalizer.clone())),
            docx_extractor: Arc::new(DocxExtractor::new(normalizer.clone())),
            text_extractor: Arc::new(TextExtractor::new(normalizer)),
        })
    }

    fn get_extractor_for_type(&self, document_type: DocumentType) -> Arc<dyn DocumentExtractor> {
        match document_type {
            DocumentType::Pdf => self.pdf_extractor.clone(),
            DocumentType::Docx | DocumentType::Doc => self.docx_extractor.clone(),
            DocumentType::Txt => self.text_extractor.clone(),
        }
    }
}

#[async_trait]
impl DocumentExtractor for CompositeDocumentExtractor {
    async fn extract(
        &self,
        data: &[u8],
        document_type: DocumentType,
    ) -> Result<ExtractedDocument, DocumentExtractionError> {
        self.get_extractor_for_type(document_type)
            .extract(data, document_type)
            .await
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        self.get_extractor_for_type(document_type)
            .can_extract(document_type)
    }
}
