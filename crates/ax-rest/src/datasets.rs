//! Dataset related operations: event ingestion and queries.
//!
//! These are the routes API tokens are scoped to. Query payloads pass
//! through as raw JSON; shaping them is left to callers.

use axiom_client::{Client, RequestMethod, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

/// Summary the server reports after an ingest request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct IngestStatus {
    /// Number of events that were successfully ingested.
    #[serde(default)]
    pub ingested: u64,
    /// Number of events that failed to ingest.
    #[serde(default)]
    pub failed: u64,
    /// Amount of raw bytes processed.
    #[serde(default, rename = "processedBytes")]
    pub processed_bytes: u64,
}

/// Handles communication with the dataset related operations of the API.
#[derive(Debug, Clone)]
pub struct DatasetsService {
    client: Client,
}

impl DatasetsService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Ingest events into the named dataset.
    #[instrument(skip(self, events), fields(dataset = dataset, events = events.len()))]
    pub async fn ingest(&self, dataset: &str, events: &[Value]) -> Result<IngestStatus> {
        let path = format!("/api/v1/datasets/{dataset}/ingest");
        let resp = self
            .client
            .call(RequestMethod::Post, &path, Some(events))
            .await?;
        Ok(resp.data)
    }

    /// Run a query against the named dataset.
    #[instrument(skip(self, query), fields(dataset = dataset))]
    pub async fn query(&self, dataset: &str, query: &Value) -> Result<Value> {
        let path = format!("/api/v1/datasets/{dataset}/query");
        let resp = self
            .client
            .call(RequestMethod::Post, &path, Some(query))
            .await?;
        Ok(resp.data)
    }

    /// Run an APL query across datasets.
    #[instrument(skip(self, query))]
    pub async fn apl_query(&self, query: &Value) -> Result<Value> {
        let resp = self
            .client
            .call(RequestMethod::Post, "/api/v1/datasets/_apl", Some(query))
            .await?;
        Ok(resp.data)
    }
}
