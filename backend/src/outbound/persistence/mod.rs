//! Persistence adapters for the document store port.

mod memory_store;

pub use memory_store::InMemoryDocumentStore;
