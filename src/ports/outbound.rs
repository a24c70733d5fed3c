//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, IntegrationDetail, IntegrationEntry, RawRecord};
use std::path::{Path, PathBuf};

/// Sort direction for [`SelectQuery::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Parameters for a single-page select against one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    /// Field labels to return. Empty = all fields.
    pub fields: Vec<String>,
    pub sort: Vec<(String, SortDirection)>,
    pub filter_by_formula: Option<String>,
    pub max_records: Option<u32>,
    /// Rows per page (store maximum is 100).
    pub page_size: Option<u32>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push((field.into(), direction));
        self
    }

    pub fn filter_by_formula(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    pub fn max_records(mut self, n: u32) -> Self {
        self.max_records = Some(n);
        self
    }

    pub fn page_size(mut self, n: u32) -> Self {
        self.page_size = Some(n);
        self
    }
}

/// Hosted table store (Airtable). Read-only.
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    /// Fetch the first page of rows of `table` matching `query`.
    /// One call, one request: continuation offsets are not followed.
    async fn select_first_page(
        &self,
        table: &str,
        query: &SelectQuery,
    ) -> Result<Vec<RawRecord>, DomainError>;

    /// Fetch a single row of `table` by its record id.
    async fn find(&self, table: &str, record_id: &str) -> Result<RawRecord, DomainError>;
}

/// Snapshot port. Hands catalog data to the page renderer as files.
#[async_trait::async_trait]
pub trait SnapshotPort: Send + Sync {
    /// Write the listing page data. Returns the written path.
    async fn write_listing(&self, entries: &[IntegrationEntry]) -> Result<PathBuf, DomainError>;

    /// Write one detail page's data as `<stem>.json`. Returns the written path.
    ///
    /// `stem` must be unique within one export; an existing file is replaced.
    async fn write_detail(
        &self,
        stem: &str,
        detail: &IntegrationDetail,
    ) -> Result<PathBuf, DomainError>;

    /// Root directory the snapshot is written under.
    fn root(&self) -> &Path;
}
