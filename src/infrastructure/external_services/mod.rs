pub mod chat_client;
pub mod document_extractors;
pub mod embeddings_client;

pub use chat_client::{ChatClientConfig, OpenRouterChatProvider};
pub use embeddings_client::{EmbeddingsClient, EmbeddingsClientConfig, OpenAiEmbeddingProvider};

use url::Url;

/// Joins `path` onto an API base such as `https://api.openai.com/v1`
/// without dropping the last base segment.
pub(crate) fn endpoint_url(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)?.join(path)
}
