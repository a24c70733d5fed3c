//! Airtable adapter module. Implements TableStore for the hosted table store.

pub mod client;

pub use client::AirtableAdapter;
