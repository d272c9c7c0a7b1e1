use crate::config::Config;
use crate::departments::DepartmentMap;
use crate::search::facets::Facets;
use crate::search::filters::{Filters, RequestParams};
use crate::search::highlight::Highlighter;
use crate::search::query::{FacetScope, PageWindow, SearchQuery};
use crate::search::results::{ApiPublication, Publication};
use crate::search::sort::secondary_sort;
use crate::solr::{SolrClient, SolrError, SolrResponse};
use std::sync::Arc;

/// Search text, filters and page requested by one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub filters: Filters,
    pub window: PageWindow,
}

impl SearchRequest {
    pub fn from_params(params: &RequestParams) -> Self {
        Self {
            query: params.trimmed("q"),
            filters: Filters::from_params(params),
            window: PageWindow::from_params(params),
        }
    }
}

/// Result of one page query.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub response: SolrResponse,
    /// Page actually served, after clamping.
    pub window: PageWindow,
    pub total: u64,
    pub total_pages: usize,
    pub facets: Facets,
}

impl SearchOutcome {
    /// Card view, in secondary order.
    pub fn cards(&self, query: &str, departments: &DepartmentMap, item_url: &str) -> Vec<Publication> {
        let highlighter = Highlighter::new(query);
        let mut cards: Vec<Publication> = self
            .response
            .response
            .docs
            .iter()
            .map(|doc| Publication::from_document(doc, &self.response, departments, &highlighter, item_url))
            .collect();
        secondary_sort(&mut cards);
        cards
    }

    /// JSON view, in engine order.
    pub fn records(&self, departments: &DepartmentMap) -> Vec<ApiPublication> {
        self.response
            .response
            .docs
            .iter()
            .map(|doc| ApiPublication::from_document(doc, &self.response, departments))
            .collect()
    }

    /// First and last row numbers shown, 1-based.
    pub fn showing(&self) -> (u64, u64) {
        if self.total == 0 {
            return (0, 0);
        }
        let start = (self.window.start() as u64).min(self.total - 1) + 1;
        let end = (self.window.start() as u64)
            .saturating_add(self.window.per_page as u64)
            .min(self.total);
        (start, end)
    }
}

#[derive(Clone)]
pub struct SearchService {
    client: SolrClient,
    config: Arc<Config>,
}

impl SearchService {
    pub fn new(client: SolrClient, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &SolrClient {
        &self.client
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fresh department mapping for one request.
    pub async fn departments(&self) -> DepartmentMap {
        DepartmentMap::load(&self.client, &self.config).await
    }

    pub fn query<'a>(&'a self, text: &'a str, filters: &'a Filters, departments: &'a DepartmentMap) -> SearchQuery<'a> {
        SearchQuery::new(text, filters, departments, &self.config.target_collection_id)
    }

    pub async fn count(&self, text: &str, filters: &Filters, departments: &DepartmentMap) -> Result<u64, SolrError> {
        let params = self.query(text, filters, departments).count();
        self.client.count(&params).await
    }

    /// Count, clamp the page, then fetch it. A failed count is logged and
    /// the requested page is used as-is.
    pub async fn search_page(
        &self,
        request: &SearchRequest,
        departments: &DepartmentMap,
        scope: FacetScope,
    ) -> Result<SearchOutcome, SolrError> {
        let query = self.query(&request.query, &request.filters, departments);

        let (mut window, counted) = match self.client.count(&query.count()).await {
            Ok(total) => (request.window.clamp(total), true),
            Err(err) => {
                tracing::warn!(%err, "pre-count failed; page not clamped");
                (request.window, false)
            }
        };

        let mut response = self.client.select(&query.page(window, scope)).await?;
        if !counted {
            let clamped = window.clamp(response.response.num_found);
            if clamped != window {
                tracing::debug!(requested = window.page, served = clamped.page, "page past the end; refetching");
                window = clamped;
                response = self.client.select(&query.page(window, scope)).await?;
            }
        }
        let total = response.response.num_found;
        let facets = if scope == FacetScope::None {
            Facets::default()
        } else {
            Facets::from_response(&response, departments)
        };

        tracing::debug!(
            total,
            page = window.page,
            per_page = window.per_page,
            docs = response.response.docs.len(),
            "search page fetched"
        );

        Ok(SearchOutcome {
            total_pages: window.total_pages(total),
            window,
            total,
            facets,
            response,
        })
    }

    /// Facet counts only, at the modal limit.
    pub async fn facets_only(&self, request: &SearchRequest, departments: &DepartmentMap) -> Result<Facets, SolrError> {
        let params = self.query(&request.query, &request.filters, departments).facets();
        let response = self.client.select(&params).await?;
        Ok(Facets::from_response(&response, departments))
    }
}
