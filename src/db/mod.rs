pub mod diesel_pool;
pub mod document_store;
pub mod memory_store;
pub mod postgres_store;

pub use diesel_pool::{create_diesel_pool, mask_connection_string, ping_pool, DieselPool, PoolSettings};
pub use document_store::{Document, DocumentStore, Fields, StoreError};
pub use memory_store::MemoryDocumentStore;
pub use postgres_store::PgDocumentStore;
