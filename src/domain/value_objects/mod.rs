pub mod chunk_metadata;
pub mod document_type;
pub mod file_hash;
pub mod metadata_filter;

pub use chunk_metadata::ChunkMetadata;
pub use document_type::DocumentType;
pub use file_hash::FileHash;
pub use metadata_filter::MetadataFilter;
