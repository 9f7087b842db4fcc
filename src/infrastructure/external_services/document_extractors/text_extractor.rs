use async_trait::async_trait;
use regex::Regex;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedDocument,
};
use crate::domain::value_objects::DocumentType;

/// Whitespace cleanup shared by every extractor: collapses runs of spaces,
/// strips spaces around line breaks and caps blank lines at one.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    horizontal_space: Regex,
    padded_newline: Regex,
    blank_lines: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self, DocumentExtractionError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))
        };

        Ok(Self {
            horizontal_space: compile(r"[ \t\u{a0}\u{c}\u{b}]+")?,
            padded_newline: compile(r" *\n *")?,
            blank_lines: compile(r"\n{3,}")?,
        })
    }

    pub fn normalize(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let text = self.horizontal_space.replace_all(&text, " ");
        let text = self.padded_newline.replace_all(&text, "\n");
        let text = self.blank_lines.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}

pub struct TextExtractor {
    normalizer: TextNormalizer,
}

impl TextExtractor {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }
}

#[async_trait]
impl DocumentExtractor for TextExtractor {
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

        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        let text = std::str::from_utf8(data).map_err(|e| {
            DocumentExtractionError::CorruptedFile(format!("Text file is not valid UTF-8: {}", e))
        })?;

        Ok(ExtractedDocument::single(self.normalizer.normalize(text)))
    }

    fn can_extract(&self, document_type: DocumentType) -> bool {
        document_type == DocumentType::Txt
    }
}
