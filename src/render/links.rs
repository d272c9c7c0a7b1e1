use crate::search::query::DEFAULT_PER_PAGE;
use crate::search::Filters;
use url::form_urlencoded;

const PAGINATION_WIDTH: usize = 7;

/// Query-string link (leading `?`) for the given search state.
pub fn page_href(query: &str, filters: &Filters, per_page: usize, page: usize) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if !query.is_empty() {
        serializer.append_pair("q", query);
    }
    for (key, value) in filters.to_query_pairs() {
        serializer.append_pair(&key, &value);
    }
    if per_page != DEFAULT_PER_PAGE {
        serializer.append_pair("per_page", &per_page.to_string());
    }
    if page > 1 {
        serializer.append_pair("page", &page.to_string());
    }
    format!("?{}", serializer.finish())
}

/// First and last page numbers of the numbered pagination strip.
pub fn pagination_range(current: usize, total_pages: usize) -> (usize, usize) {
    let total_pages = total_pages.max(1);
    let current = current.clamp(1, total_pages);
    let mut start = current.saturating_sub(PAGINATION_WIDTH / 2).max(1);
    let end = (start + PAGINATION_WIDTH - 1).min(total_pages);
    if end - start < PAGINATION_WIDTH - 1 {
        start = end.saturating_sub(PAGINATION_WIDTH - 1).max(1);
    }
    (start, end)
}
