mod embedding_provider;
mod event_sink;
mod memory_storage;
mod retriever;
mod write_policy;

pub use embedding_provider::{EmbeddingProviderMetadata, IEmbeddingProvider};
pub use event_sink::IEventSink;
pub use memory_storage::{IMemoryStorage, ListFilter, ScoredMemory};
pub use retriever::{IRetriever, RetrievalQuery};
pub use write_policy::{IWritePolicy, WritePolicyInput};
