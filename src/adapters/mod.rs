//! Infrastructure adapters. Implement outbound ports.
//!
//! Airtable, in-memory store, snapshot files, terminal UI. Map errors to DomainError.

pub mod airtable;
pub mod memory;
pub mod persistence;
pub mod ui;
