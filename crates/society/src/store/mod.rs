//! Data-access layer: documents keyed by collection, the user directory complaints are checked
//! against, and the service that validates drafts before they reach the store.

pub mod document;
pub mod memory;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use document::{Document, RecordId};
pub use memory::{InMemoryDocumentStore, InMemoryUserDirectory};
pub use repository::{DocumentStore, StoreError, UserDirectory};
pub use service::{Clock, ServiceError, SocietyService};
