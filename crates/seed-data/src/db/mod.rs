//! Collaborator wiring for seeding runs.
//!
//! [`SeedServices`] carries the document store and identity service every
//! generator writes through; [`Backend`] builds them from the environment.

mod backend;

pub use backend::{Backend, SeedServices};
