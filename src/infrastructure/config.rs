use std::env;
use std::str::FromStr;

use crate::application::services::ingestion_service::DEFAULT_EMBEDDING_BATCH_SIZE;
use crate::application::use_cases::upload_document::DEFAULT_MAX_UPLOAD_BYTES;
use crate::infrastructure::external_services::{ChatClientConfig, EmbeddingsClientConfig};

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
    OverlapTooLarge { chunk_size: usize, chunk_overlap: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} not set", key),
            ConfigError::Invalid { key, value } => write!(f, "Invalid value for {}: {:?}", key, value),
            ConfigError::OverlapTooLarge {
                chunk_size,
                chunk_overlap,
            } => write!(
                f,
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                chunk_overlap, chunk_size
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embedding_batch_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server: ServerConfig,
    pub chunking: ChunkingConfig,
    pub embeddings: EmbeddingsClientConfig,
    pub chat: ChatClientConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            port: vars.parse_or("PORT", server_defaults.port)?,
            max_upload_bytes: vars.parse_or("MAX_UPLOAD_BYTES", server_defaults.max_upload_bytes)?,
        };

        let chunking_defaults = ChunkingConfig::default();
        let chunking = ChunkingConfig {
            chunk_size: vars.parse_or("CHUNK_SIZE", chunking_defaults.chunk_size)?,
            chunk_overlap: vars.parse_or("CHUNK_OVERLAP", chunking_defaults.chunk_overlap)?,
            embedding_batch_size: vars
                .parse_or("EMBEDDING_BATCH_SIZE", chunking_defaults.embedding_batch_size)?,
        };

        if chunking.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                key: "CHUNK_SIZE",
                value: "0".to_string(),
            });
        }
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                chunk_size: chunking.chunk_size,
                chunk_overlap: chunking.chunk_overlap,
            });
        }
        if chunking.embedding_batch_size == 0 {
            return Err(ConfigError::Invalid {
                key: "EMBEDDING_BATCH_SIZE",
                value: "0".to_string(),
            });
        }

        let timeout_secs = vars.parse_or("HTTP_TIMEOUT_SECS", 60u64)?;

        let embedding_defaults = EmbeddingsClientConfig::default();
        let embeddings = EmbeddingsClientConfig {
            api_url: vars.string_or("EMBEDDING_API_URL", &embedding_defaults.api_url),
            api_key: vars
                .get("EMBEDDING_API_KEY")
                .or_else(|| vars.get("OPENAI_API_KEY")),
            model: vars.string_or("EMBEDDING_MODEL", &embedding_defaults.model),
            dimension: vars.parse_or("EMBEDDING_DIMENSION", embedding_defaults.dimension)?,
            timeout_secs,
        };

        let chat_defaults = ChatClientConfig::default();
        let chat = ChatClientConfig {
            api_url: vars.string_or("CHAT_API_URL", &chat_defaults.api_url),
            api_key: vars.required("OPENROUTER_API_KEY")?,
            model: vars.string_or("CHAT_MODEL", &chat_defaults.model),
            temperature: vars.parse_or("CHAT_TEMPERATURE", chat_defaults.temperature)?,
            timeout_secs,
        };

        Ok(Self {
            database_url: vars.required("DATABASE_URL")?,
            server,
            chunking,
            embeddings,
            chat,
        })
    }
}

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("DATABASE_URL".to_string(), "postgres://localhost/docs".to_string()),
            ("OPENROUTER_API_KEY".to_string(), "or-key".to_string()),
        ]);
        for (key, value) in pairs {
            vars.insert(key.to_string(), value.to_string());
        }
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.chunking, ChunkingConfig::default());
        assert_eq!(config.embeddings.model, "text-embedding-3-small");
        assert_eq!(config.embeddings.dimension, 1536);
        assert_eq!(config.embeddings.api_key, None);
        assert_eq!(config.chat.model, "openai/gpt-4.1-mini");
        assert_eq!(config.chat.api_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.chat.temperature, 0.0);
        assert_eq!(config.chat.timeout_secs, 60);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("CHUNK_SIZE", "500"),
            ("CHUNK_OVERLAP", "50"),
            ("OPENAI_API_KEY", "sk-fallback"),
            ("CHAT_TEMPERATURE", "0.3"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(config.embeddings.api_key.as_deref(), Some("sk-fallback"));
        assert_eq!(config.chat.temperature, 0.3);
    }

    #[test]
    fn test_embedding_key_wins_over_openai_key() {
        let config = config(&[("OPENAI_API_KEY", "a"), ("EMBEDDING_API_KEY", "b")]).unwrap();
        assert_eq!(config.embeddings.api_key.as_deref(), Some("b"));
    }

    #[test]
    fn test_missing_required_values() {
        let result = AppConfig::from_lookup(|_| None);
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
        assert_eq!(
            config(&[("CHUNK_SIZE", "100"), ("CHUNK_OVERLAP", "100")]).unwrap_err(),
            ConfigError::OverlapTooLarge {
                chunk_size: 100,
                chunk_overlap: 100
            }
        );
    }
}
