use std::sync::Arc;

use crate::{
    application::{
        ports::{ChatProvider, DocumentExtractor, EmbeddingProvider},
        services::{DocumentIngestionService, RagPipeline, RecursiveCharacterSplitter, TextSplitter, ToolRegistry},
        use_cases::{
            AskQuestionUseCase, GetCollectionStatsUseCase, ListDocumentsUseCase,
            UploadDocumentUseCase,
        },
    },
    domain::repositories::DocumentRepository,
    infrastructure::{
        config::AppConfig,
        database::{create_connection_pool, repositories::PostgresDocumentRepository, run_migrations},
        external_services::{
            EmbeddingsClient, OpenAiEmbeddingProvider, OpenRouterChatProvider,
            document_extractors::CompositeDocumentExtractor,
        },
    },
    presentation::http::handlers::{AskHandler, UploadHandler},
};

pub struct AppContainer {
    // HTTP Handlers
    pub upload_handler: Arc<UploadHandler>,
    pub ask_handler: Arc<AskHandler>,
}

impl AppContainer {
    pub fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_pool = create_connection_pool(&config.database_url)?;
        run_migrations(&db_pool).map_err(|e| format!("Failed to run database migrations: {}", e))?;

        let document_repository: Arc<dyn DocumentRepository> =
            Arc::new(PostgresDocumentRepository::new(db_pool));

        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(
            OpenAiEmbeddingProvider::new(EmbeddingsClient::new(config.embeddings.clone())?),
        );
        let chat_provider: Arc<dyn ChatProvider> =
            Arc::new(OpenRouterChatProvider::new(config.chat.clone())?);

        let document_extractor: Arc<dyn DocumentExtractor> = Arc::new(
            CompositeDocumentExtractor::new()
                .map_err(|e| format!("Failed to create document extractor: {}", e))?,
        );
        let splitter =
            RecursiveCharacterSplitter::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
        tracing::info!(
            "Chunking at {} characters with {} overlap",
            splitter.chunk_size(),
            splitter.chunk_overlap()
        );
        let text_splitter: Arc<dyn TextSplitter> = Arc::new(splitter);

        let ingestion_service = Arc::new(
            DocumentIngestionService::new(
                document_extractor,
                text_splitter,
                embedding_provider.clone(),
                document_repository.clone(),
            )
            .with_batch_size(config.chunking.embedding_batch_size),
        );
        tracing::info!(
            "Using embedding model {} ({} dims) and chat model {}",
            embedding_provider.model_name(),
            embedding_provider.embedding_dimension(),
            chat_provider.model_name()
        );
        let rag_pipeline = Arc::new(RagPipeline::new(
            embedding_provider,
            document_repository.clone(),
            chat_provider,
            ToolRegistry::new(),
        ));

        let upload_document_use_case = Arc::new(UploadDocumentUseCase::new(
            ingestion_service,
            config.server.max_upload_bytes,
        ));
        let collection_stats_use_case =
            Arc::new(GetCollectionStatsUseCase::new(document_repository.clone()));
        let list_documents_use_case =
            Arc::new(ListDocumentsUseCase::new(document_repository.clone()));
        let ask_question_use_case =
            Arc::new(AskQuestionUseCase::new(rag_pipeline, document_repository));

        let upload_handler = Arc::new(UploadHandler::new(
            upload_document_use_case,
            collection_stats_use_case,
            list_documents_use_case,
        ));
        let ask_handler = Arc::new(AskHandler::new(ask_question_use_case));

        Ok(Self {
            upload_handler,
            ask_handler,
        })
    }
}
