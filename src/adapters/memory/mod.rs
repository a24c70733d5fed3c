//! In-memory table store for tests and offline development.
//!
//! Holds rows per table, counts `find` calls (total and peak in flight) and
//! can be told to fail.

use crate::domain::{DomainError, Fields, RawRecord};
use crate::ports::{SelectQuery, TableStore};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// In-memory TableStore.
///
/// `select_first_page` supports the subset of queries the catalog issues:
/// field projection, `max_records`, `page_size` and `{Field} = 'value'` formulas.
/// Rows come back in insertion order (tests insert them pre-sorted).
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<RawRecord>>,
    failing_tables: HashSet<String>,
    failing_records: HashSet<String>,
    find_calls: AtomicUsize,
    finds_in_flight: AtomicUsize,
    peak_finds_in_flight: AtomicUsize,
    last_query: Mutex<Option<SelectQuery>>,
    /// Simulated latency per call.
    delay: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Append a row to `table`.
    pub fn insert(&mut self, table: &str, record: RawRecord) {
        self.tables.entry(table.to_string()).or_default().push(record);
    }

    /// Every call against `table` fails with a transport error.
    pub fn fail_table(&mut self, table: &str) {
        self.failing_tables.insert(table.to_string());
    }

    /// `find` for this record id fails with a transport error.
    pub fn fail_record(&mut self, record_id: &str) {
        self.failing_records.insert(record_id.to_string());
    }

    /// Number of `find` calls served (successful or not).
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `find` calls that were running at the same time.
    pub fn peak_finds_in_flight(&self) -> usize {
        self.peak_finds_in_flight.load(Ordering::SeqCst)
    }

    /// Last query passed to `select_first_page`.
    pub fn last_query(&self) -> Option<SelectQuery> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn check_table(&self, table: &str) -> Result<&[RawRecord], DomainError> {
        if self.failing_tables.contains(table) {
            return Err(DomainError::Transport(format!(
                "[MOCK] table {} unreachable",
                table
            )));
        }
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| DomainError::Api {
                status: 404,
                body: format!("[MOCK] unknown table {}", table),
            })
    }
}

/// Parse `{Field} = 'value'` as built by `domain::formula::field_equals`.
fn parse_equals(formula: &str) -> Option<(String, String)> {
    let rest = formula.strip_prefix('{')?;
    let (field, rest) = rest.split_once('}')?;
    let literal = rest.trim().strip_prefix('=')?.trim();
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            value.push(chars.next()?);
        } else {
            value.push(c);
        }
    }
    Some((field.to_string(), value))
}

fn project(fields: &Fields, keep: &[String]) -> Fields {
    if keep.is_empty() {
        return fields.clone();
    }
    fields
        .iter()
        .filter(|(k, _)| keep.iter().any(|f| f == *k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[async_trait::async_trait]
impl TableStore for MemoryStore {
    async fn select_first_page(
        &self,
        table: &str,
        query: &SelectQuery,
    ) -> Result<Vec<RawRecord>, DomainError> {
        self.simulate_latency().await;
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some(query.clone());
        }
        let rows = self.check_table(table)?;

        let filter = match &query.filter_by_formula {
            Some(f) => Some(parse_equals(f).ok_or_else(|| DomainError::Api {
                status: 422,
                body: format!("[MOCK] unsupported formula {}", f),
            })?),
            None => None,
        };

        let limit = [query.max_records, query.page_size]
            .into_iter()
            .flatten()
            .min()
            .map(|n| n as usize)
            .unwrap_or(usize::MAX);
        let out: Vec<RawRecord> = rows
            .iter()
            .filter(|r| match &filter {
                Some((field, value)) => {
                    r.fields.get(field).and_then(Value::as_str) == Some(value.as_str())
                }
                None => true,
            })
            .take(limit)
            .map(|r| RawRecord::new(r.id.clone(), project(&r.fields, &query.fields)))
            .collect();
        info!(table, count = out.len(), "[MOCK] select");
        Ok(out)
    }

    async fn find(&self, table: &str, record_id: &str) -> Result<RawRecord, DomainError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.finds_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_finds_in_flight.fetch_max(running, Ordering::SeqCst);
        self.simulate_latency().await;
        self.finds_in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing_records.contains(record_id) {
            return Err(DomainError::Transport(format!(
                "[MOCK] record {} unreachable",
                record_id
            )));
        }
        self.check_table(table)?
            .iter()
            .find(|r| r.id == record_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("{}/{}", table, record_id)))
    }
}
