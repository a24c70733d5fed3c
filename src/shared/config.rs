//! Application configuration. Airtable credentials, table ids, output paths.

use serde::Deserialize;
use tracing::warn;

/// Airtable REST API root (v0).
pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

/// Directory the snapshot export writes into when CATALOG_OUTPUT_DIR is unset.
pub const DEFAULT_OUTPUT_DIR: &str = "./site-data";

/// Per-request timeout for the store client. A hung call would otherwise stall the build.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Airtable
    // ─────────────────────────────────────────────────────────────────────────
    /// Airtable personal access token / API key. Read from AIRTABLE_API_KEY.
    #[serde(default)]
    pub airtable_api_key: Option<String>,

    /// Base id (appXXXX). Read from AIRTABLE_BASE_ID.
    #[serde(default)]
    pub airtable_base_id: Option<String>,

    /// Integrations table id or name. Read from AIRTABLE_TABLE_ID.
    #[serde(default)]
    pub airtable_table_id: Option<String>,

    /// Creators table id or name. Read from AIRTABLE_CREATOR_TABLE_ID.
    #[serde(default)]
    pub airtable_creator_table_id: Option<String>,

    /// API root override (tests, proxies). Read from AIRTABLE_API_URL.
    #[serde(default)]
    pub airtable_api_url: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────
    /// Snapshot output directory. Read from CATALOG_OUTPUT_DIR.
    #[serde(default)]
    pub output_dir: Option<String>,

    /// HTTP timeout in seconds. Parsed from CATALOG_HTTP_TIMEOUT_SECS in `load`,
    /// outside the typed deserialize, so a bad value only loses this setting.
    #[serde(skip)]
    pub http_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("CATALOG"));
        if let Ok(path) = std::env::var("CATALOG_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        cfg.http_timeout_secs = std::env::var("CATALOG_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| parse_timeout_secs(&s));
        Ok(cfg)
    }

    /// Returns the Airtable API key from config or AIRTABLE_API_KEY env.
    pub fn airtable_api_key(&self) -> Option<String> {
        self.airtable_api_key
            .clone()
            .or_else(|| non_empty_env("AIRTABLE_API_KEY"))
    }

    /// Returns the base id from config or AIRTABLE_BASE_ID env.
    pub fn airtable_base_id(&self) -> Option<String> {
        self.airtable_base_id
            .clone()
            .or_else(|| non_empty_env("AIRTABLE_BASE_ID"))
    }

    /// Returns the integrations table id from config or AIRTABLE_TABLE_ID env.
    pub fn airtable_table_id(&self) -> Option<String> {
        self.airtable_table_id
            .clone()
            .or_else(|| non_empty_env("AIRTABLE_TABLE_ID"))
    }

    /// Returns the creators table id from config or AIRTABLE_CREATOR_TABLE_ID env.
    pub fn airtable_creator_table_id(&self) -> Option<String> {
        self.airtable_creator_table_id
            .clone()
            .or_else(|| non_empty_env("AIRTABLE_CREATOR_TABLE_ID"))
    }

    /// Returns the API root. Defaults to the public Airtable v0 endpoint.
    pub fn airtable_api_url_or_default(&self) -> String {
        self.airtable_api_url
            .clone()
            .or_else(|| non_empty_env("AIRTABLE_API_URL"))
            .unwrap_or_else(|| DEFAULT_AIRTABLE_API_URL.to_string())
    }

    /// Returns the snapshot output directory. Defaults to `./site-data`.
    pub fn output_dir_or_default(&self) -> String {
        self.output_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
    }

    /// Returns the HTTP timeout in seconds. Defaults to 30.
    pub fn http_timeout_secs_or_default(&self) -> u64 {
        self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
    }

    /// Returns true if every value needed to reach both tables is present.
    pub fn is_airtable_configured(&self) -> bool {
        self.airtable_api_key().is_some()
            && self.airtable_base_id().is_some()
            && self.airtable_table_id().is_some()
            && self.airtable_creator_table_id().is_some()
    }
}

/// Positive whole seconds; anything else is ignored with a warning.
fn parse_timeout_secs(raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(value = raw, "ignoring invalid CATALOG_HTTP_TIMEOUT_SECS");
            None
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig {
            airtable_api_url: Some("http://localhost:9999/v0".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.output_dir_or_default(), DEFAULT_OUTPUT_DIR);
        assert_eq!(cfg.http_timeout_secs_or_default(), 30);
        assert_eq!(cfg.airtable_api_url_or_default(), "http://localhost:9999/v0");
    }

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(parse_timeout_secs("45"), Some(45));
        assert_eq!(parse_timeout_secs(" 10 "), Some(10));
        assert_eq!(parse_timeout_secs("abc"), None);
        assert_eq!(parse_timeout_secs("0"), None);
    }

    #[test]
    fn test_load_keeps_other_values_when_timeout_is_invalid() {
        // Only test that touches these variables.
        unsafe {
            std::env::set_var("CATALOG_OUTPUT_DIR", "/custom/out");
            std::env::set_var("CATALOG_HTTP_TIMEOUT_SECS", "abc");
        }
        let loaded = AppConfig::load();
        unsafe {
            std::env::remove_var("CATALOG_OUTPUT_DIR");
            std::env::remove_var("CATALOG_HTTP_TIMEOUT_SECS");
        }

        let cfg = loaded.unwrap();
        assert_eq!(cfg.output_dir_or_default(), "/custom/out");
        assert_eq!(cfg.http_timeout_secs, None);
        assert_eq!(cfg.http_timeout_secs_or_default(), DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_configured_from_fields() {
        let cfg = AppConfig {
            airtable_api_key: Some("key".into()),
            airtable_base_id: Some("app1".into()),
            airtable_table_id: Some("tblA".into()),
            airtable_creator_table_id: Some("tblB".into()),
            ..Default::default()
        };
        assert!(cfg.is_airtable_configured());
    }
}
