//! # Resource Module
//!
//! The generic CRUD-resource pattern: record traits, field parsing,
//! record stores, the handler, and error translation.

pub mod errors;
pub mod fields;
pub mod handler;
pub mod record;
pub mod store;

pub use errors::{ErrorResponse, MessageResponse, ResourceError, ResourceResult};
pub use fields::FieldSet;
pub use handler::{AccessPolicy, DeleteMessage, Operation, ResourceHandler};
pub use record::{Record, RecordKey};
pub use store::{FileRecordStore, InMemoryRecordStore, RecordStore, StoreError, StoreResult};
