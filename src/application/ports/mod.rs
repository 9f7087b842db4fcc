pub mod chat_provider;
pub mod document_extractor;
pub mod embedding_provider;

pub use chat_provider::ChatProvider;
pub use document_extractor::DocumentExtractor;
pub use embedding_provider::EmbeddingProvider;
