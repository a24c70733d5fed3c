//! Catalog fetch logic: list all integrations with creators joined in, or
//! fetch one integration by name for its detail page.
//!
//! - Creator references are deduplicated before any lookup is launched
//! - Lookups run in parallel and are awaited as a batch
//! - Every remote failure degrades the result instead of propagating

use crate::domain::fields::{extract_image_field, first_reference, normalize_record};
use crate::domain::formula::field_equals;
use crate::domain::{Creator, DomainError, Fields, IntegrationDetail, IntegrationEntry};
use crate::ports::{SelectQuery, SortDirection, TableStore};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Fields requested for listing cards. `Text` is only needed on detail pages.
pub const LISTING_FIELDS: &[&str] = &[
    "Name",
    "Description",
    "Image",
    "Creator",
    "Link",
    "Platform",
];

/// Rows requested for the single listing page (the store's maximum).
pub const LISTING_PAGE_SIZE: u32 = 100;

/// Sort key of the integrations table.
pub const SORT_FIELD: &str = "ID";

/// Field the detail route segment is matched against.
pub const NAME_FIELD: &str = "Name";

/// Normalized key of the creator reference field.
const CREATOR_KEY: &str = "creator";

/// Table ids the catalog reads from.
#[derive(Debug, Clone)]
pub struct CatalogTables {
    pub integrations: String,
    pub creators: String,
}

/// Catalog service. Reads the integrations and creators tables through a TableStore.
pub struct CatalogService {
    store: Arc<dyn TableStore>,
    tables: CatalogTables,
}

impl CatalogService {
    pub fn new(store: Arc<dyn TableStore>, tables: CatalogTables) -> Self {
        Self { store, tables }
    }

    /// All integrations in the store's `ID` order, creators resolved.
    ///
    /// Never fails: a failed page fetch is logged and yields an empty list.
    pub async fn fetch_all_records(&self) -> Vec<IntegrationEntry> {
        match self.try_fetch_all_records().await {
            Ok(entries) => entries,
            Err(e) => {
                error!(
                    table = %self.tables.integrations,
                    error = %e,
                    "failed to fetch integrations"
                );
                Vec::new()
            }
        }
    }

    async fn try_fetch_all_records(&self) -> Result<Vec<IntegrationEntry>, DomainError> {
        let query = SelectQuery::new()
            .fields(LISTING_FIELDS.iter().copied())
            .sort(SORT_FIELD, SortDirection::Asc)
            .page_size(LISTING_PAGE_SIZE);
        let records = self
            .store
            .select_first_page(&self.tables.integrations, &query)
            .await?;

        let rows: Vec<Fields> = records.iter().map(normalize_record).collect();
        let creator_ids = distinct_creator_refs(&rows);
        info!(
            rows = rows.len(),
            creators = creator_ids.len(),
            "fetched integrations, resolving creators"
        );

        let creators = self.resolve_creators(creator_ids).await;

        let entries: Vec<IntegrationEntry> = rows
            .into_iter()
            .filter_map(|row| {
                let joined = extract_image_field(&join_creator(row, &creators));
                let id = joined.get("id").and_then(Value::as_str).map(str::to_owned);
                match serde_json::from_value::<IntegrationEntry>(Value::Object(joined)) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(
                            record_id = ?id,
                            error = %e,
                            "skipping undecodable integration row"
                        );
                        None
                    }
                }
            })
            .collect();

        info!(count = entries.len(), "integrations composed");
        Ok(entries)
    }

    /// One lookup per id, all launched before any is awaited.
    /// Failed lookups are logged and left out of the returned map.
    async fn resolve_creators(&self, creator_ids: Vec<String>) -> HashMap<String, Creator> {
        let mut lookups = JoinSet::new();
        for creator_id in creator_ids {
            let store = Arc::clone(&self.store);
            let table = self.tables.creators.clone();
            lookups.spawn(async move {
                let result = fetch_creator(store.as_ref(), &table, &creator_id).await;
                (creator_id, result)
            });
        }

        let mut resolved = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((creator_id, Ok(creator))) => {
                    debug!(creator_id = %creator_id, "creator resolved");
                    resolved.insert(creator_id, creator);
                }
                Ok((creator_id, Err(e))) => {
                    warn!(
                        creator_id = %creator_id,
                        error = %e,
                        "creator lookup failed, dropping creator"
                    );
                }
                Err(e) => {
                    error!(error = %e, "creator lookup task panicked");
                }
            }
        }
        resolved
    }

    /// Detail data for the integration whose `Name` equals `name`.
    ///
    /// Returns `None` when nothing matches, when `name` cannot be placed in a
    /// filter formula, or when the store call fails (logged).
    pub async fn fetch_record_by_name(&self, name: &str) -> Option<IntegrationDetail> {
        match self.try_fetch_record_by_name(name).await {
            Ok(detail) => detail,
            Err(e) => {
                error!(name, error = %e, "failed to fetch integration by name");
                None
            }
        }
    }

    async fn try_fetch_record_by_name(
        &self,
        name: &str,
    ) -> Result<Option<IntegrationDetail>, DomainError> {
        let query = SelectQuery::new()
            .filter_by_formula(field_equals(NAME_FIELD, name)?)
            .max_records(1);
        let records = self
            .store
            .select_first_page(&self.tables.integrations, &query)
            .await?;

        let Some(record) = records.first() else {
            info!(name, "integration not found");
            return Ok(None);
        };

        // The detail view never shows the creator; raw references must not leak.
        let mut row = normalize_record(record);
        row.remove(CREATOR_KEY);
        let row = extract_image_field(&row);
        let detail = serde_json::from_value::<IntegrationDetail>(Value::Object(row))?;
        Ok(Some(detail))
    }
}

/// Distinct first creator references, in first-seen order.
pub fn distinct_creator_refs(rows: &[Fields]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for row in rows {
        if let Some(creator_id) = first_reference(row, CREATOR_KEY) {
            if seen.insert(creator_id.to_string()) {
                ordered.push(creator_id.to_string());
            }
        }
    }
    ordered
}

/// Swap the raw creator reference for the resolved Creator, or drop the field.
fn join_creator(mut row: Fields, creators: &HashMap<String, Creator>) -> Fields {
    let resolved = first_reference(&row, CREATOR_KEY)
        .and_then(|creator_id| creators.get(creator_id))
        .and_then(|creator| serde_json::to_value(creator).ok());
    match resolved {
        Some(value) => {
            row.insert(CREATOR_KEY.to_string(), value);
        }
        None => {
            row.remove(CREATOR_KEY);
        }
    }
    row
}

async fn fetch_creator(
    store: &dyn TableStore,
    table: &str,
    creator_id: &str,
) -> Result<Creator, DomainError> {
    let record = store.find(table, creator_id).await?;
    let fields = extract_image_field(&normalize_record(&record));
    Ok(serde_json::from_value(Value::Object(fields))?)
}
