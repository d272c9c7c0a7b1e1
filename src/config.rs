use serde::{Deserialize, Serialize};
use std::net::IpAddr;

pub const SCHOLARLY_OUTPUT_LABEL: &str = "Scholarly Output";
pub const RESEARCHERS_LABEL: &str = "Researchers";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    pub bind_addr: IpAddr,
    pub solr_url: String,
    pub root_community_id: String,
    pub excluded_community_id: Option<String>,
    pub target_collection_id: String,
    pub researchers_collection_id: Option<String>,
    pub repository_item_url: String,
    pub solr_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub export_default_rows: usize,
    pub export_max_rows: usize,
    pub export_batch_rows: usize,
    pub cors_allowed_origins: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(IpAddr::from([0, 0, 0, 0]));

        let solr_url = std::env::var("SOLR_URL")
            .unwrap_or_else(|_| "http://localhost:8983/solr/search/select".to_string());

        let root_community_id = std::env::var("ROOT_COMMUNITY_ID").unwrap_or_default();
        let excluded_community_id = non_empty_var("EXCLUDED_COMMUNITY_ID");
        let target_collection_id = std::env::var("TARGET_COLLECTION_ID").unwrap_or_default();
        let researchers_collection_id = non_empty_var("RESEARCHERS_COLLECTION_ID");
        let repository_item_url = std::env::var("REPOSITORY_ITEM_URL").unwrap_or_default();

        let solr_timeout_secs = std::env::var("SOLR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let export_default_rows = std::env::var("EXPORT_DEFAULT_ROWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100_000);

        let export_max_rows = std::env::var("EXPORT_MAX_ROWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100_000);

        let export_batch_rows = std::env::var("EXPORT_BATCH_ROWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &usize| *v > 0)
            .unwrap_or(1000);

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS").ok();

        let config = Self {
            port,
            bind_addr,
            solr_url,
            root_community_id,
            excluded_community_id,
            target_collection_id,
            researchers_collection_id,
            repository_item_url,
            solr_timeout_secs,
            request_timeout_secs,
            export_default_rows,
            export_max_rows,
            export_batch_rows,
            cors_allowed_origins,
        };
        config.warn_missing();
        Ok(config)
    }

    /// Collection ids with fixed department labels, applied after discovery.
    pub fn department_overrides(&self) -> Vec<(String, String)> {
        let mut overrides = Vec::new();
        if !self.target_collection_id.is_empty() {
            overrides.push((
                self.target_collection_id.clone(),
                SCHOLARLY_OUTPUT_LABEL.to_string(),
            ));
        }
        if let Some(id) = &self.researchers_collection_id {
            overrides.push((id.clone(), RESEARCHERS_LABEL.to_string()));
        }
        overrides
    }

    /// Rows an export may emit: the requested count (or the default) capped by the hard limit.
    pub fn export_row_limit(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|r| *r > 0)
            .unwrap_or(self.export_default_rows)
            .min(self.export_max_rows)
    }

    fn warn_missing(&self) {
        if self.root_community_id.is_empty() {
            tracing::warn!("ROOT_COMMUNITY_ID is not set; department discovery will find nothing");
        }
        if self.target_collection_id.is_empty() {
            tracing::warn!("TARGET_COLLECTION_ID is not set; searches are not scoped to a collection");
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
