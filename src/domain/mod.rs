//! Core domain layer. No external I/O dependencies.
//!
//! Entities, field normalization and the filter formula builder live here.
//! Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod fields;
pub mod formula;

pub use entities::{
    Creator, Fields, ImageReference, IntegrationDetail, IntegrationEntry, RawRecord,
};
pub use errors::DomainError;
