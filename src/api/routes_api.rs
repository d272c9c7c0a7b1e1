use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::search::{ApiPublication, FacetScope, Facets, RequestParams, SearchRequest};
use axum::extract::{RawQuery, State};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub error: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self { error: false, data })
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub per_page: usize,
    pub total: u64,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchData {
    pub results: Vec<ApiPublication>,
    pub facets: Facets,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct FacetData {
    pub facets: Facets,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiData {
    Search(SearchData),
    Facets(FacetData),
}

/// `GET /api/publications?action=search|facets`.
pub async fn publications(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Envelope<ApiData>>, ApiError> {
    let params = RequestParams::parse(raw.as_deref().unwrap_or_default());
    let request = SearchRequest::from_params(&params);

    match params.get("action").unwrap_or("search") {
        "search" => {
            let departments = state.service.departments().await;
            let outcome = state
                .service
                .search_page(&request, &departments, FacetScope::Api)
                .await?;
            let results = outcome.records(&departments);
            Ok(Envelope::ok(ApiData::Search(SearchData {
                results,
                pagination: Pagination {
                    current_page: outcome.window.page,
                    per_page: outcome.window.per_page,
                    total: outcome.total,
                    total_pages: outcome.total_pages,
                },
                facets: outcome.facets,
            })))
        }
        "facets" => {
            let departments = state.service.departments().await;
            let facets = state.service.facets_only(&request, &departments).await?;
            Ok(Envelope::ok(ApiData::Facets(FacetData { facets })))
        }
        other => Err(ApiError::bad_request(format!("unknown action: {other}"))),
    }
}
