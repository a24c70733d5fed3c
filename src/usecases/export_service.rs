//! Export service. Writes the catalog snapshot consumed by the page renderer.
//!
//! One listing file plus one detail file per named integration, mirroring the
//! listing page and its per-name detail routes. Detail files are named after
//! the slugged name; a slug already used in the run gets the record id appended.

use crate::domain::{DomainError, IntegrationDetail};
use crate::ports::SnapshotPort;
use crate::usecases::catalog_service::CatalogService;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Paths written by one export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub listing_path: PathBuf,
    pub detail_paths: Vec<PathBuf>,
    /// Names whose detail lookup came back empty, or that repeat an exported name.
    pub skipped: Vec<String>,
}

pub struct ExportService {
    catalog: Arc<CatalogService>,
    snapshot: Arc<dyn SnapshotPort>,
}

impl ExportService {
    pub fn new(catalog: Arc<CatalogService>, snapshot: Arc<dyn SnapshotPort>) -> Self {
        Self { catalog, snapshot }
    }

    /// Fetch everything and write the snapshot.
    ///
    /// Fetch failures degrade (empty listing, skipped details); only write
    /// failures are returned as errors.
    pub async fn export(&self) -> Result<ExportReport, DomainError> {
        let entries = self.catalog.fetch_all_records().await;
        if entries.is_empty() {
            warn!("catalog is empty, writing empty listing");
        }
        let listing_path = self.snapshot.write_listing(&entries).await?;

        let mut report = ExportReport {
            listing_path,
            ..Default::default()
        };

        let mut seen_names = HashSet::new();
        let mut used_stems = HashSet::new();

        // Sequential: one detail query per route, like the static build.
        for name in entries.iter().filter_map(|e| e.name.as_deref()) {
            // A name route resolves to the first matching row only.
            if !seen_names.insert(name) {
                warn!(name, "duplicate name, detail already exported");
                report.skipped.push(name.to_string());
                continue;
            }
            match self.catalog.fetch_record_by_name(name).await {
                Some(detail) => {
                    let stem = unique_stem(&detail, &mut used_stems);
                    let path = self.snapshot.write_detail(&stem, &detail).await?;
                    report.detail_paths.push(path);
                }
                None => {
                    warn!(name, "detail not found, skipping");
                    report.skipped.push(name.to_string());
                }
            }
        }

        info!(
            root = %self.snapshot.root().display(),
            records = entries.len(),
            details = report.detail_paths.len(),
            skipped = report.skipped.len(),
            "snapshot exported"
        );
        Ok(report)
    }
}

/// File-system safe slug: ASCII alphanumerics kept (lower-cased), runs of anything else become `-`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Detail file stem for `detail`, unique among `used`, which it is added to.
///
/// `<slug(name)>`, falling back to the record id when the name slugs to
/// nothing; `<slug(name)>-<id>` when the plain slug is taken.
fn unique_stem(detail: &IntegrationDetail, used: &mut HashSet<String>) -> String {
    let id = Some(slug(&detail.entry.id))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "record".to_string());
    let base = detail
        .name()
        .map(slug)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| id.clone());

    let mut stem = base.clone();
    if used.contains(&stem) {
        stem = format!("{}-{}", base, id);
    }
    let mut n = 2;
    while used.contains(&stem) {
        stem = format!("{}-{}-{}", base, id, n);
        n += 1;
    }
    used.insert(stem.clone());
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::adapters::persistence::SnapshotJson;
    use crate::domain::{Fields, RawRecord};
    use crate::ports::TableStore;
    use crate::usecases::catalog_service::CatalogTables;
    use serde_json::{Value, json};

    fn fields(v: Value) -> Fields {
        v.as_object().cloned().unwrap()
    }

    fn catalog(store: MemoryStore) -> Arc<CatalogService> {
        Arc::new(CatalogService::new(
            Arc::new(store) as Arc<dyn TableStore>,
            CatalogTables {
                integrations: "ints".to_string(),
                creators: "creators".to_string(),
            },
        ))
    }

    fn tmp_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("lnc_export_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&p);
        p
    }

    fn row(id: &str, v: Value) -> RawRecord {
        RawRecord::new(id, fields(v))
    }

    fn files_in(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_export_writes_listing_and_details() {
        let mut store = MemoryStore::new();
        store.insert("ints", row("r1", json!({"Name": "Zapier", "Text": "z"})));
        store.insert("ints", row("r2", json!({"Name": "Bubble"})));
        store.insert("ints", row("r3", json!({"Description": "nameless"})));
        store.insert("creators", RawRecord::new("c1", Fields::new()));

        let dir = tmp_dir("ok");
        let svc = ExportService::new(catalog(store), Arc::new(SnapshotJson::new(&dir)));
        let report = svc.export().await.unwrap();

        assert_eq!(report.listing_path, dir.join("integrations.json"));
        assert_eq!(report.detail_paths.len(), 2);
        assert!(report.skipped.is_empty());
        assert!(dir.join("integration").join("zapier.json").exists());
        assert!(dir.join("integration").join("bubble.json").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_export_colliding_slugs_get_distinct_files() {
        let mut store = MemoryStore::new();
        store.insert("ints", row("r1", json!({"Name": "Near Bubble", "Text": "first"})));
        store.insert("ints", row("r2", json!({"Name": "near-bubble", "Text": "second"})));

        let dir = tmp_dir("collide");
        let svc = ExportService::new(catalog(store), Arc::new(SnapshotJson::new(&dir)));
        let report = svc.export().await.unwrap();

        let detail_dir = dir.join("integration");
        assert_eq!(
            report.detail_paths,
            vec![
                detail_dir.join("near-bubble.json"),
                detail_dir.join("near-bubble-r2.json"),
            ]
        );
        assert_eq!(files_in(&detail_dir), report.detail_paths.len());

        let first: Value =
            serde_json::from_str(&std::fs::read_to_string(&report.detail_paths[0]).unwrap())
                .unwrap();
        assert_eq!(first["text"], "first");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_export_duplicate_name_is_skipped() {
        let mut store = MemoryStore::new();
        store.insert("ints", row("r1", json!({"Name": "Zapier"})));
        store.insert("ints", row("r2", json!({"Name": "Zapier"})));

        let dir = tmp_dir("dup");
        let svc = ExportService::new(catalog(store), Arc::new(SnapshotJson::new(&dir)));
        let report = svc.export().await.unwrap();

        assert_eq!(report.detail_paths.len(), 1);
        assert_eq!(report.skipped, ["Zapier"]);
        assert_eq!(files_in(&dir.join("integration")), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Zapier"), "zapier");
        assert_eq!(slug("  NEAR x Bubble.io!! "), "near-x-bubble-io");
        assert_eq!(slug("../../etc/passwd"), "etc-passwd");
        assert_eq!(slug("???"), "");
    }

    #[test]
    fn test_unique_stem_falls_back_to_id() {
        let detail: IntegrationDetail =
            serde_json::from_value(json!({"id": "recABC", "name": "???"})).unwrap();
        let mut used = HashSet::new();
        assert_eq!(unique_stem(&detail, &mut used), "recabc");
        assert_eq!(unique_stem(&detail, &mut used), "recabc-recabc");
        assert_eq!(unique_stem(&detail, &mut used), "recabc-recabc-2");
    }

    #[tokio::test]
    async fn test_export_with_unreachable_store_writes_empty_listing() {
        let mut store = MemoryStore::new();
        store.fail_table("ints");

        let dir = tmp_dir("empty");
        let svc = ExportService::new(catalog(store), Arc::new(SnapshotJson::new(&dir)));
        let report = svc.export().await.unwrap();

        let body: Value =
            serde_json::from_str(&std::fs::read_to_string(&report.listing_path).unwrap())
                .unwrap();
        assert_eq!(body["count"], 0);
        assert!(report.detail_paths.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
