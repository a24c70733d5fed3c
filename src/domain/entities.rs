//! Domain entities. Pure data structures for the catalog.
//!
//! No Airtable/IO types here — raw store rows are mapped into these by the use cases.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field map of a single store row, keyed by field label.
pub type Fields = Map<String, Value>;

/// A row as returned by the table store, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Single image kept from an attachment list (the store returns an ordered list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReference {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Author of one or more integrations. Lives in the creators table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// GitHub handle, rendered as `https://github.com/<handle>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
}

/// One card on the listing page.
///
/// `creator` is either resolved or absent; raw reference ids never reach callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub platform: String,
}

/// Detail page model: an entry plus its long-form text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationDetail {
    #[serde(flatten)]
    pub entry: IntegrationEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl IntegrationDetail {
    pub fn name(&self) -> Option<&str> {
        self.entry.name.as_deref()
    }
}
