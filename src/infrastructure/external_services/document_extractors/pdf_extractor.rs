use async_trait::async_trait;
use lopdf::Document;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use super::TextNormalizer;
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedDocument, ExtractedPage,
};
use crate::domain::value_objects::DocumentType;

pub struct PdfExtractor {
    password: String,
    normalizer: TextNormalizer,
}

impl PdfExtractor {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self {
            password: String::new(),
            normalizer,
        }
    }

    fn load(&self, data: &[u8]) -> Result<Document, DocumentExtractionError> {
        let mut doc = Document::load_mem(data)
            .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;

        if doc.is_encrypted() {
            doc.decrypt(&self.password).map_err(|_e| {
                DocumentExtractionError::ExtractionFailed(
                    "Failed to decrypt PDF - invalid password".to_string(),
                )
            })?;
        }

        Ok(doc)
    }

    /// Pages are extracted in parallel; a page that fails is skipped unless
    /// every page fails.
    fn extract_pages(&self, doc: &Document) -> Result<Vec<ExtractedPage>, DocumentExtractionError> {
        let pages = doc.get_pages();
        let page_total = pages.len();

        let mut results: Vec<Result<ExtractedPage, String>> = pages
            .into_par_iter()
            .map(|(page_number, _)| {
                let text = doc.extract_text(&[page_number]).map_err(|e| {
                    format!("Failed to extract text from page {}: {}", page_number, e)
                })?;

                Ok(ExtractedPage {
                    page_number: Some(page_number),
                    text: self.normalizer.normalize(&text),
                })
            })
            .collect();

        results.sort_by_key(|result| match result {
            Ok(page) => page.page_number,
            Err(_) => None,
        });

        let mut extracted = Vec::with_capacity(page_total);
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(page) => extracted.push(page),
                Err(e) => errors.push(e),
            }
        }

        for error in &errors {
            tracing::warn!("{}", error);
        }

        if extracted.is_empty() && !errors.is_empty() {
            return Err(DocumentExtractionError::ExtractionFailed(errors.join("; ")));
        }

        Ok(extracted)
    }

    fn title(doc: &Document) -> Option<String> {
        let info = doc.trailer.get(b"Info").ok()?;
        let info = match info.as_reference() {
            Ok(id) => doc.get_object(id).ok()?,
            Err(_) => info,
        };
        let title = info.as_dict().ok()?.get(b"Title").ok()?.as_str().ok()?;

        std::str::from_utf8(title)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
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

        let doc = self.load(data)?;
        let pages = self.extract_pages(&doc)?;

        Ok(ExtractedDocument {
            pages,
            title: Self::title(&doc),
        })
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        document_type == DocumentType::Pdf
    }
}
