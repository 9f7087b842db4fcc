pub mod composite_extractor;
pub mod docx_extractor;
pub mod pdf_extractor;
pub mod text_extractor;

pub use composite_extractor::CompositeDocumentExtractor;
pub use docx_extractor::DocxExtractor;
pub use pdf_extractor::PdfExtractor;
pub use text_extractor::{TextExtractor, TextNormalizer};
