use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use crate::forwarder::EventSink;
use crate::payload::AddEventsRequest;

/// Sink that POSTs addEvents documents to a DataSet ingestion endpoint.
///
/// The response body is read and logged but not parsed: any HTTP status
/// counts as delivered. Only transport-level failures (connect, timeout)
/// surface as delivery errors.
pub struct DatasetSink {
    client: reqwest::Client,
    endpoint: String,
    write_token: String,
}

impl DatasetSink {
    /// Build a sink with a bounded per-request timeout so a stalled
    /// endpoint cannot stall ingestion indefinitely.
    pub fn new(
        endpoint: impl Into<String>,
        write_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            write_token: write_token.into(),
        })
    }
}

#[async_trait::async_trait]
impl EventSink for DatasetSink {
    async fn deliver(&self, payload: AddEventsRequest) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.write_token)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to POST batch to {}", self.endpoint))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!("Ingestion endpoint responded {}: {}", status, body);

        Ok(())
    }
}
