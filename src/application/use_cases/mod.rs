pub mod ask_question;
pub mod get_collection_stats;
pub mod list_documents;
pub mod upload_document;

pub use ask_question::AskQuestionUseCase;
pub use get_collection_stats::GetCollectionStatsUseCase;
pub use list_documents::ListDocumentsUseCase;
pub use upload_document::UploadDocumentUseCase;
