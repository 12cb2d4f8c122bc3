//! Domain records and collaborator contracts for the Green social app.
//!
//! The seed generator in `seed-data` writes every entity through the
//! [`store::DocumentStore`] and [`identity::IdentityService`] traits defined
//! here, so the same generation code runs against Postgres, Firebase, or the
//! in-memory fakes used in tests.

pub mod database;
pub mod errors;
pub mod identity;
pub mod memory;
pub mod models;
pub mod store;

pub use errors::{IdentityError, StoreError};
pub use identity::{IdentityService, MemoryIdentity, NewPrincipal, Principal};
pub use memory::{MemoryStore, StoreOp};
pub use store::{DocKey, Document, DocumentStore, FieldValue};
