use crate::solr::params::SolrParams;
use crate::solr::response::SolrResponse;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SolrError {
    #[error("search backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search backend answered with status {status}")]
    Status { status: u16 },
    #[error("failed to parse search backend response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// GET client for a Solr select handler.
#[derive(Clone)]
pub struct SolrClient {
    client: Arc<Client>,
    endpoint: String,
}

impl SolrClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SolrError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn select(&self, params: &SolrParams) -> Result<SolrResponse, SolrError> {
        let url = format!("{}?{}", self.endpoint, params.to_query_string());
        tracing::debug!(
            q = params.get("q").unwrap_or_default(),
            rows = params.get("rows").unwrap_or_default(),
            start = params.get("start").unwrap_or_default(),
            "solr select"
        );

        let response = self.client.get(&url).send().await.map_err(|err| {
            tracing::warn!(%err, "solr request failed");
            SolrError::Transport(err)
        })?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            tracing::warn!(status, "solr returned non-success status");
            return Err(SolrError::Status { status });
        }

        let body = response.bytes().await?;
        let parsed: SolrResponse = serde_json::from_slice(&body).map_err(|err| {
            tracing::warn!(%err, "solr response is not valid json");
            SolrError::Parse(err)
        })?;
        Ok(parsed)
    }

    /// Match count for `params` without fetching documents.
    pub async fn count(&self, params: &SolrParams) -> Result<u64, SolrError> {
        let mut params = params.clone();
        params.set("rows", 0).remove("facet").remove("facet.field").remove("hl");
        let response = self.select(&params).await?;
        Ok(response.response.num_found)
    }
}
