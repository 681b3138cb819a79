//! Record schemas for a residential society: flat assignments, buildings, complaints,
//! notifications, and visitor logs, plus the document-store service and HTTP router that
//! create, read, update, and delete them.

pub mod config;
pub mod error;
pub mod records;
pub mod router;
pub mod store;
pub mod telemetry;

pub use records::{
    Assignment, Building, Complaint, ComplaintStatus, Notification, Record, Role, Visitor,
    VisitorStatus,
};
pub use router::society_router;
pub use store::{
    Document, DocumentStore, InMemoryDocumentStore, InMemoryUserDirectory, RecordId,
    ServiceError, SocietyService, StoreError, UserDirectory,
};
