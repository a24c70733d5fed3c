//! Application use cases. Orchestrate domain logic via ports.

pub mod catalog_service;
pub mod export_service;

pub use catalog_service::{CatalogService, CatalogTables};
pub use export_service::{ExportReport, ExportService};
