pub mod ingestion_service;
pub mod rag_pipeline;
pub mod text_splitter;
pub mod tool_registry;

pub use ingestion_service::DocumentIngestionService;
pub use rag_pipeline::RagPipeline;
pub use text_splitter::{RecursiveCharacterSplitter, TextSplitter};
pub use tool_registry::ToolRegistry;
