use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::http::{
    handlers::{AskHandler, UploadHandler},
    routes::{ask_routes, health_routes, not_found_handler, upload_routes},
};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub struct HttpServer {
    upload_handler: Arc<UploadHandler>,
    ask_handler: Arc<AskHandler>,
    port: u16,
}

impl HttpServer {
    pub fn new(upload_handler: Arc<UploadHandler>, ask_handler: Arc<AskHandler>, port: Option<u16>) -> Self {
        Self {
            upload_handler,
            ask_handler,
            port: port.unwrap_or(3000),
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let body_limit = self.upload_handler.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

        Router::new()
            .merge(health_routes())
            .merge(upload_routes(self.upload_handler.clone()))
            .merge(ask_routes(self.ask_handler.clone()))
            .fallback(not_found_handler)
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(body_limit))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            )
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::ports::{ChatProvider, DocumentExtractor, EmbeddingProvider};
    use crate::application::services::rag_pipeline::NO_DOCUMENTS_ANSWER;
    use crate::application::services::{
        DocumentIngestionService, RagPipeline, RecursiveCharacterSplitter, TextSplitter,
        ToolRegistry,
    };
    use crate::application::test_support::{
        FakeEmbeddingProvider, InMemoryDocumentRepository, PlainTextExtractor,
        ScriptedChatProvider,
    };
    use crate::application::use_cases::{
        AskQuestionUseCase, GetCollectionStatsUseCase, ListDocumentsUseCase,
        UploadDocumentUseCase,
    };
    use crate::domain::repositories::DocumentRepository;

    const BOUNDARY: &str = "docassist-test-boundary";

    struct TestApp {
        server: HttpServer,
        repository: Arc<InMemoryDocumentRepository>,
        chat: Arc<ScriptedChatProvider>,
    }

    fn test_app(chat: ScriptedChatProvider, max_upload_bytes: usize) -> TestApp {
        let repository = Arc::new(InMemoryDocumentRepository::new());
        let chat = Arc::new(chat);
        let document_repository: Arc<dyn DocumentRepository> = repository.clone();
        let chat_provider: Arc<dyn ChatProvider> = chat.clone();
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(FakeEmbeddingProvider::new());
        let extractor: Arc<dyn DocumentExtractor> = Arc::new(PlainTextExtractor);
        let splitter: Arc<dyn TextSplitter> =
            Arc::new(RecursiveCharacterSplitter::new(200, 20).unwrap());

        let ingestion = Arc::new(DocumentIngestionService::new(
            extractor,
            splitter,
            embedding_provider.clone(),
            document_repository.clone(),
        ));
        let pipeline = Arc::new(RagPipeline::new(
            embedding_provider,
            document_repository.clone(),
            chat_provider,
            ToolRegistry::new(),
        ));

        let upload_handler = Arc::new(UploadHandler::new(
            Arc::new(UploadDocumentUseCase::new(ingestion, max_upload_bytes)),
            Arc::new(GetCollectionStatsUseCase::new(document_repository.clone())),
            Arc::new(ListDocumentsUseCase::new(document_repository.clone())),
        ));
        let ask_handler = Arc::new(AskHandler::new(Arc::new(AskQuestionUseCase::new(
            pipeline,
            document_repository,
        ))));

        TestApp {
            server: HttpServer::new(upload_handler, ask_handler, None),
            repository,
            chat,
        }
    }

    fn multipart_upload(field: &str, file_name: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{content}\r\n--{b}--\r\n",
            b = BOUNDARY,
        );

        Request::builder()
            .method("POST")
            .uri("/upload/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn ask_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upload_text_document() {
        let app = test_app(ScriptedChatProvider::new(vec![]), 1024);

        let (status, body) = send(
            &app,
            multipart_upload("file", "policy.txt", "Refunds are accepted within thirty days."),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Document uploaded successfully");
        assert_eq!(body["filename"], "policy.txt");
        assert_eq!(body["chunks_created"], 1);
        assert!(body["document_id"].as_str().is_some_and(|id| id.len() == 36));
        assert_eq!(app.repository.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let app = test_app(ScriptedChatProvider::new(vec![]), 64);

        let (status, body) = send(&app, multipart_upload("file", "setup.exe", "MZ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid file type");
        assert_eq!(body["detail"], "Allowed types: .pdf, .docx, .doc, .txt");

        let (status, body) = send(&app, multipart_upload("file", "big.txt", &"a".repeat(100))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "File too large");

        let (status, body) = send(&app, multipart_upload("file", "setup.exe", &"M".repeat(100))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid file type");

        let (status, body) = send(&app, multipart_upload("document", "a.txt", "hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");

        let (status, body) = send(&app, multipart_upload("file", "blank.txt", "   ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Document processing error");

        assert_eq!(app.repository.len(), 0);
    }

    #[tokio::test]
    async fn test_ask_with_empty_store_skips_the_model() {
        let app = test_app(ScriptedChatProvider::answering("unused"), 1024);

        let (status, body) = send(&app, ask_request(json!({"question": "What is the refund policy?"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], NO_DOCUMENTS_ANSWER);
        assert_eq!(body["retrieved_chunks"], json!([]));
        assert!(body["tool_calls"].is_null());
        assert_eq!(app.chat.request_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_then_ask() {
        let app = test_app(ScriptedChatProvider::answering("Within thirty days."), 1024);
        send(
            &app,
            multipart_upload("file", "policy.txt", "Refunds are accepted within thirty days."),
        )
        .await;

        let (status, body) = send(
            &app,
            ask_request(json!({"question": "Are refunds accepted?", "max_results": 3})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Within thirty days.");
        assert_eq!(body["tokens_used"], 42);
        let chunks = body["retrieved_chunks"].as_array().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0]["metadata"]["source"], "policy.txt");
        assert!(chunks[0]["similarity_score"].as_f64().is_some());
    }

    #[tokio::test]
    async fn test_ask_validation() {
        let app = test_app(ScriptedChatProvider::new(vec![]), 1024);

        let (status, body) = send(&app, ask_request(json!({"question": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid question");

        let (status, _) = send(&app, ask_request(json!({"question": "Hi", "max_results": 11}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, ask_request(json!({"max_results": 2}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_ask_simple() {
        let app = test_app(ScriptedChatProvider::answering("Thirty days."), 1024);
        send(&app, multipart_upload("file", "policy.txt", "Refunds take thirty days.")).await;

        let request = Request::builder()
            .method("POST")
            .uri("/ask/simple?question=How+long+do+refunds+take%3F")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"answer": "Thirty days."}));
    }

    #[tokio::test]
    async fn test_collection_endpoints() {
        let app = test_app(ScriptedChatProvider::new(vec![]), 1024);
        send(&app, multipart_upload("file", "a.txt", "First document.")).await;
        send(&app, multipart_upload("file", "b.txt", "Second document.")).await;

        let (status, stats) = send(&app, get("/upload/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats, json!({"total_documents": 2, "table_name": "documents"}));

        let (status, listing) = send(&app, get("/upload/list-documents")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["total_chunks"], 2);
        assert_eq!(listing["unique_documents"], 2);
        assert_eq!(listing["documents"][0]["filename"], "b.txt");
        assert_eq!(listing["documents"][0]["file_type"], ".txt");
    }

    #[tokio::test]
    async fn test_health_root_and_fallback() {
        let app = test_app(ScriptedChatProvider::new(vec![]), 1024);

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (_, body) = send(&app, get("/ask/health")).await;
        assert_eq!(body, json!({"status": "healthy", "service": "ask"}));

        let (_, body) = send(&app, get("/")).await;
        assert_eq!(body["endpoints"]["ask"], "/ask/");

        let (status, body) = send(&app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["detail"], "The endpoint /nope does not exist");
    }
}
