//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.
//!
//! `--export` writes the snapshot and exits (for build pipelines); otherwise
//! the interactive browser runs.

use dotenv::dotenv;
use lnc_catalog::adapters::airtable::AirtableAdapter;
use lnc_catalog::adapters::persistence::SnapshotJson;
use lnc_catalog::adapters::ui::TuiInputPort;
use lnc_catalog::ports::{InputPort, SnapshotPort, TableStore};
use lnc_catalog::shared::config::AppConfig;
use lnc_catalog::usecases::{CatalogService, CatalogTables, ExportService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let export_only = std::env::args().skip(1).any(|a| a == "--export");

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "invalid configuration, falling back to defaults");
            AppConfig::default()
        }
    };
    if !cfg.is_airtable_configured() {
        anyhow::bail!(
            "Set AIRTABLE_API_KEY, AIRTABLE_BASE_ID, AIRTABLE_TABLE_ID \
             and AIRTABLE_CREATOR_TABLE_ID (env or .env)"
        );
    }

    // --- Table store ---
    let api_url = cfg.airtable_api_url_or_default();
    let timeout = Duration::from_secs(cfg.http_timeout_secs_or_default());
    info!(url = %api_url, timeout_secs = timeout.as_secs(), "using Airtable store");
    let store: Arc<dyn TableStore> = Arc::new(
        AirtableAdapter::new(
            api_url,
            cfg.airtable_api_key().unwrap_or_default(),
            cfg.airtable_base_id().unwrap_or_default(),
            timeout,
        )
        .map_err(|e| anyhow::anyhow!("{}", e))?,
    );

    // --- Services ---
    let catalog = Arc::new(CatalogService::new(
        store,
        CatalogTables {
            integrations: cfg.airtable_table_id().unwrap_or_default(),
            creators: cfg.airtable_creator_table_id().unwrap_or_default(),
        },
    ));

    let output_dir = PathBuf::from(cfg.output_dir_or_default());
    info!(path = %output_dir.display(), "snapshot directory");
    let snapshot: Arc<dyn SnapshotPort> = Arc::new(SnapshotJson::new(&output_dir));
    let export_service = Arc::new(ExportService::new(Arc::clone(&catalog), snapshot));

    if export_only {
        let report = export_service
            .export()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        info!(
            listing = %report.listing_path.display(),
            details = report.detail_paths.len(),
            skipped = report.skipped.len(),
            "export finished"
        );
        return Ok(());
    }

    lnc_catalog::adapters::ui::init_ui();

    // --- Run (main menu -> List / Show / Export) ---
    let input_port: Arc<dyn InputPort> =
        Arc::new(TuiInputPort::new(Arc::clone(&catalog), export_service));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
