use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::render::{Loaded, PageBody, PageModel};
use crate::search::{FacetScope, RequestParams, SearchRequest};
use axum::extract::{RawQuery, State};
use axum::response::Html;

/// Full HTML search page. Upstream errors become a banner; only a broken
/// template turns into an error response.
pub async fn publications(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, ApiError> {
    let params = RequestParams::parse(raw.as_deref().unwrap_or_default());
    let request = SearchRequest::from_params(&params);
    let departments = state.service.departments().await;

    let (window, body) = match state
        .service
        .search_page(&request, &departments, FacetScope::Page)
        .await
    {
        Ok(outcome) => {
            let cards = outcome.cards(&request.query, &departments, &state.config.repository_item_url);
            let showing = outcome.showing();
            (
                outcome.window,
                PageBody::Loaded(Loaded {
                    cards,
                    showing,
                    total: outcome.total,
                    total_pages: outcome.total_pages,
                    facets: outcome.facets,
                }),
            )
        }
        Err(err) => {
            tracing::warn!(%err, "search page query failed");
            (request.window, PageBody::Failed(err.to_string()))
        }
    };

    let html = state.pages.render(&PageModel {
        query: &request.query,
        filters: &request.filters,
        window,
        body,
    })?;
    Ok(Html(html))
}
