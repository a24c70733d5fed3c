//! Persistence adapters. Snapshot files handed to the page renderer.

pub mod snapshot_json;

pub use snapshot_json::SnapshotJson;
