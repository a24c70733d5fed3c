//! Airtable adapter. Implements TableStore over the Airtable REST API (v0).
//!
//! Only the first page of a select is requested; the `offset` cursor in the
//! response is ignored.

use crate::domain::{DomainError, Fields, RawRecord};
use crate::ports::{SelectQuery, TableStore};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Characters of an error body kept in `DomainError::Api`.
const MAX_ERROR_BODY: usize = 200;

/// Airtable REST client bound to one base.
///
/// Requires a personal access token (or legacy API key) with read access to the base.
pub struct AirtableAdapter {
    client: Client,
    api_url: String,
    api_key: String,
    base_id: String,
}

impl AirtableAdapter {
    /// Create a new Airtable adapter.
    ///
    /// # Arguments
    /// * `api_url` - API root (e.g. "https://api.airtable.com/v0")
    /// * `api_key` - Bearer token
    /// * `base_id` - Base id (appXXXX)
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_url: String,
        api_key: String,
        base_id: String,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            base_id,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.api_url, self.base_id, table)
    }

    /// Flatten a SelectQuery into Airtable's bracketed query parameters.
    fn query_params(query: &SelectQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for field in &query.fields {
            params.push(("fields[]".to_string(), field.clone()));
        }
        for (i, (field, direction)) in query.sort.iter().enumerate() {
            params.push((format!("sort[{}][field]", i), field.clone()));
            params.push((
                format!("sort[{}][direction]", i),
                direction.as_str().to_string(),
            ));
        }
        if let Some(formula) = &query.filter_by_formula {
            params.push(("filterByFormula".to_string(), formula.clone()));
        }
        if let Some(n) = query.max_records {
            params.push(("maxRecords".to_string(), n.to_string()));
        }
        if let Some(n) = query.page_size {
            params.push(("pageSize".to_string(), n.to_string()));
        }
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<T, DomainError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, url, "Airtable API returned error");
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DomainError::NotFound(url.to_string()));
            }
            return Err(DomainError::Api {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::Decode(format!("Failed to parse Airtable response: {}", e)))
    }
}

/// `GET /{base}/{table}` response.
#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<AirtableRecord>,
    #[serde(default)]
    offset: Option<String>,
}

/// One row. `createdTime` is not used by the catalog.
#[derive(Deserialize)]
struct AirtableRecord {
    id: String,
    #[serde(default)]
    fields: Fields,
}

impl From<AirtableRecord> for RawRecord {
    fn from(r: AirtableRecord) -> Self {
        RawRecord::new(r.id, r.fields)
    }
}

#[async_trait::async_trait]
impl TableStore for AirtableAdapter {
    async fn select_first_page(
        &self,
        table: &str,
        query: &SelectQuery,
    ) -> Result<Vec<RawRecord>, DomainError> {
        let url = self.table_url(table);
        let params = Self::query_params(query);
        let page: ListResponse = self.get_json(&url, &params).await?;
        debug!(
            table,
            count = page.records.len(),
            has_more = page.offset.is_some(),
            "fetched first page"
        );
        Ok(page.records.into_iter().map(RawRecord::from).collect())
    }

    async fn find(&self, table: &str, record_id: &str) -> Result<RawRecord, DomainError> {
        let url = format!("{}/{}", self.table_url(table), record_id);
        let record: AirtableRecord = self.get_json(&url, &[]).await?;
        debug!(table, record_id, "fetched record");
        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SortDirection;

    fn adapter() -> AirtableAdapter {
        AirtableAdapter::new(
            "https://api.airtable.com/v0/".to_string(),
            "key".to_string(),
            "appBase".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_table_url_trims_slash() {
        assert_eq!(
            adapter().table_url("tblX"),
            "https://api.airtable.com/v0/appBase/tblX"
        );
    }

    #[test]
    fn test_query_params() {
        let q = SelectQuery::new()
            .fields(["Name", "Image"])
            .sort("ID", SortDirection::Asc)
            .filter_by_formula("{Name} = 'a'")
            .max_records(1)
            .page_size(100);
        let params = AirtableAdapter::query_params(&q);
        let expected: Vec<(String, String)> = [
            ("fields[]", "Name"),
            ("fields[]", "Image"),
            ("sort[0][field]", "ID"),
            ("sort[0][direction]", "asc"),
            ("filterByFormula", "{Name} = 'a'"),
            ("maxRecords", "1"),
            ("pageSize", "100"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn test_list_response_parse() {
        let body = r#"{
            "records": [{
                "id": "rec1",
                "createdTime": "2022-09-01T00:00:00.000Z",
                "fields": {"Name": "A", "Creator": ["recC"]}
            }],
            "offset": "itr1"
        }"#;
        let page: ListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.offset.as_deref(), Some("itr1"));
        let raw: RawRecord = page.records.into_iter().next().unwrap().into();
        assert_eq!(raw.id, "rec1");
        assert_eq!(raw.fields["Name"], "A");
    }

    #[test]
    fn test_record_without_fields() {
        let r: AirtableRecord = serde_json::from_str(r#"{"id":"rec2"}"#).unwrap();
        assert!(r.fields.is_empty());
    }
}
