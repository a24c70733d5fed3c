//! lnc-catalog: low/no-code integrations catalog for NEAR, built from Airtable.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
