use serde_json::{Map, Value};

/// JSON object a stored row's metadata must contain (`metadata @> filter`)
/// to be eligible for retrieval.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataFilter(Map<String, Value>);

impl MetadataFilter {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn by_document_id(document_id: impl Into<String>) -> Self {
        Self::new().with("document_id", Value::String(document_id.into()))
    }

    pub fn by_source(source: impl Into<String>) -> Self {
        Self::new().with("source", Value::String(source.into()))
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Top-level containment check with the same meaning as Postgres `@>`
    /// for flat filters. Backs the in-memory repository.
    #[cfg(test)]
    pub fn matches(&self, metadata: &Value) -> bool {
        let Some(object) = metadata.as_object() else {
            return self.is_empty();
        };

        self.0
            .iter()
            .all(|(key, expected)| object.get(key) == Some(expected))
    }
}

impl std::fmt::Display for MetadataFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
