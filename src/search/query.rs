//! Request → Solr parameter translation.

use crate::departments::DepartmentMap;
use crate::search::filters::{coerce_int, FilterDimension, Filters, RequestParams};
use crate::solr::SolrParams;

pub const PER_PAGE_OPTIONS: [usize; 4] = [25, 50, 100, 500];
pub const DEFAULT_PER_PAGE: usize = 25;

pub const SEARCH_FIELDS: &str = "dc.title^2 dc.contributor.author author_ac dc.source";
pub const HIGHLIGHT_FIELDS: &str = "dc.title dc.contributor.author author_ac dc.source";
pub const PRIMARY_SORT: &str = "dateIssued.year desc";
pub const EXPORT_SORT: &str = "dateIssued.year desc, search.resourceid asc";

pub const FACET_FIELDS: [&str; 8] = [
    "dateIssued.year",
    "dc.type_facet",
    "location.coll",
    "language_keyword",
    "dc.publisher_facet",
    "person.affiliation.country_facet",
    "oaire.venue.unpaywall_facet",
    "author_facet",
];

/// Highest page a request may ask for; keeps `start` inside Solr's int range.
pub const MAX_PAGE: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageWindow {
    pub fn new(page: i64, per_page: i64) -> Self {
        let page = usize::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .unwrap_or(1)
            .min(MAX_PAGE);
        let per_page = usize::try_from(per_page)
            .ok()
            .filter(|n| PER_PAGE_OPTIONS.contains(n))
            .unwrap_or(DEFAULT_PER_PAGE);
        Self { page, per_page }
    }

    pub fn from_params(params: &RequestParams) -> Self {
        let page = params.get("page").map(coerce_int).unwrap_or(1);
        let per_page = params
            .get("per_page")
            .map(coerce_int)
            .unwrap_or(DEFAULT_PER_PAGE as i64);
        Self::new(page, per_page)
    }

    pub fn start(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn total_pages(&self, total: u64) -> usize {
        let per_page = self.per_page as u64;
        (total.div_ceil(per_page)).max(1) as usize
    }

    /// Moves the page back inside `1..=total_pages`.
    pub fn clamp(self, total: u64) -> Self {
        Self {
            page: self.page.min(self.total_pages(total)),
            ..self
        }
    }
}

/// Which facet directives ride along with a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetScope {
    None,
    /// HTML sidebar.
    Page,
    /// JSON search response.
    Api,
    /// "See more" modal.
    Modal,
}

impl FacetScope {
    pub fn limit(self) -> Option<usize> {
        match self {
            FacetScope::None => None,
            FacetScope::Page => Some(20),
            FacetScope::Api => Some(100),
            FacetScope::Modal => Some(500),
        }
    }
}

/// Quoted Solr phrase with `\` and `"` escaped.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Everything needed to build any of the upstream queries for one request.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery<'a> {
    pub text: &'a str,
    pub filters: &'a Filters,
    pub departments: &'a DepartmentMap,
    pub target_collection: &'a str,
}

impl<'a> SearchQuery<'a> {
    pub fn new(
        text: &'a str,
        filters: &'a Filters,
        departments: &'a DepartmentMap,
        target_collection: &'a str,
    ) -> Self {
        Self {
            text: text.trim(),
            filters,
            departments,
            target_collection,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Base scope plus one OR group per active dimension, all ANDed.
    pub fn filter_query(&self) -> String {
        let mut clauses = vec![format!(
            "search.resourcetype:Item AND location.coll:{}",
            self.target_collection
        )];

        for dim in FilterDimension::ALL {
            if dim == FilterDimension::Year && self.filters.year_range.is_some() {
                continue;
            }
            let values = self.filters.values(dim);
            if values.is_empty() {
                continue;
            }
            let terms: Vec<String> = match dim {
                FilterDimension::Year => values
                    .iter()
                    .map(|v| format!("dateIssued.year:{}", coerce_int(v)))
                    .collect(),
                FilterDimension::Department => values
                    .iter()
                    .flat_map(|name| self.departments.codes_for(name))
                    .map(|code| format!("location.comm:{code}"))
                    .collect(),
                _ => values
                    .iter()
                    .map(|v| format!("{}:{}", filter_field(dim), quote(v)))
                    .collect(),
            };
            if !terms.is_empty() {
                clauses.push(format!("({})", terms.join(" OR ")));
            }
        }

        if let Some((from, to)) = self.filters.year_range {
            clauses.push(format!("dateIssued.year:[{from} TO {to}]"));
        }
        clauses.join(" AND ")
    }

    /// `q`, relevance and scope parameters shared by every query shape.
    fn base(&self) -> SolrParams {
        let mut params = SolrParams::new();
        if self.has_text() {
            let phrase = quote(self.text);
            params
                .set("q", self.text)
                .set("defType", "edismax")
                .set("qf", SEARCH_FIELDS)
                .set("pf", SEARCH_FIELDS)
                .set("mm", 1)
                .set("ps", 1)
                .set(
                    "bq",
                    format!(
                        "dc.title:{phrase}^10 dc.contributor.author:{phrase}^5 author_ac:{phrase}^5 dc.source:{phrase}^5"
                    ),
                );
        } else {
            params.set("q", "*:*");
        }
        params
            .set("fq", self.filter_query())
            .set("sort", PRIMARY_SORT)
            .set("wt", "json");
        params
    }

    fn with_highlighting(&self, params: &mut SolrParams) {
        params
            .set("hl", "true")
            .set("hl.simple.pre", "<mark>")
            .set("hl.simple.post", "</mark>");
        if self.has_text() {
            params
                .set("hl.fl", HIGHLIGHT_FIELDS)
                .set("hl.fragsize", 200)
                .set("hl.q", self.text);
        } else {
            params.set("hl.fl", "dc.title");
        }
    }

    fn with_facets(params: &mut SolrParams, limit: usize) {
        params
            .set("facet", "true")
            .set("facet.mincount", 1)
            .set("facet.limit", limit)
            .remove("facet.field");
        for field in FACET_FIELDS {
            params.push("facet.field", field);
        }
    }

    /// One page of results, highlighted, with optional facets.
    pub fn page(&self, window: PageWindow, scope: FacetScope) -> SolrParams {
        let mut params = self.base();
        params.set("rows", window.per_page).set("start", window.start());
        self.with_highlighting(&mut params);
        if let Some(limit) = scope.limit() {
            Self::with_facets(&mut params, limit);
        }
        params
    }

    pub fn count(&self) -> SolrParams {
        let mut params = self.base();
        params.set("rows", 0);
        params
    }

    /// Facet counts only, at the modal limit.
    pub fn facets(&self) -> SolrParams {
        let mut params = self.count();
        Self::with_facets(&mut params, FacetScope::Modal.limit().unwrap_or(500));
        params
    }

    /// Export window: requested fields, stable sort, no highlighting.
    pub fn export(&self, fields: &[&str], start: usize, rows: usize) -> SolrParams {
        let mut params = self.base();
        params
            .set("sort", EXPORT_SORT)
            .set("fl", fields.join(","))
            .set("rows", rows)
            .set("start", start);
        params
    }
}

fn filter_field(dim: FilterDimension) -> &'static str {
    match dim {
        FilterDimension::Author => "author_facet",
        FilterDimension::Year => "dateIssued.year",
        FilterDimension::Type => "dc.type_facet",
        FilterDimension::Department => "location.comm",
        FilterDimension::Language => "language_keyword",
        FilterDimension::Country => "person.affiliation.country_facet",
        FilterDimension::Source => "dc.publisher_facet",
        FilterDimension::OpenAccess => "oaire.venue.unpaywall",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(raw: &str) -> Filters {
        Filters::from_params(&RequestParams::parse(raw))
    }

    #[test]
    fn page_window_falls_back_to_defaults() {
        assert_eq!(PageWindow::new(0, 30), PageWindow { page: 1, per_page: 25 });
        assert_eq!(PageWindow::new(3, 100), PageWindow { page: 3, per_page: 100 });
        assert_eq!(PageWindow::new(-2, -1), PageWindow::default());
        assert_eq!(PageWindow::new(2, 50).start(), 50);
    }

    #[test]
    fn huge_pages_are_capped_before_offsetting() {
        let window = PageWindow::new(90_000_000_000_000_000, 500);
        assert_eq!(window.page, MAX_PAGE);
        assert_eq!(window.start(), (MAX_PAGE - 1) * 500);
        assert!(window.start() <= i32::MAX as usize);
        let clamped = window.clamp(100);
        assert_eq!(clamped, PageWindow { page: 1, per_page: 500 });
    }

    #[test]
    fn clamp_keeps_page_within_total() {
        let window = PageWindow::new(9, 25);
        assert_eq!(window.total_pages(0), 1);
        assert_eq!(window.total_pages(51), 3);
        assert_eq!(window.clamp(51).page, 3);
        assert_eq!(window.clamp(1000).page, 9);
    }

    #[test]
    fn quote_escapes_backslash_and_quote() {
        assert_eq!(quote(r#"O"Brien\x"#), r#""O\"Brien\\x""#);
    }

    #[test]
    fn filter_query_groups_each_dimension() {
        let f = filters("author[]=A&author[]=B&type=Article&year=2020&year=bad");
        let map = DepartmentMap::new();
        let q = SearchQuery::new("", &f, &map, "coll-1");
        assert_eq!(
            q.filter_query(),
            "search.resourcetype:Item AND location.coll:coll-1 AND \
             (author_facet:\"A\" OR author_facet:\"B\") AND \
             (dateIssued.year:2020 OR dateIssued.year:0) AND \
             (dc.type_facet:\"Article\")"
        );
    }

    #[test]
    fn year_range_replaces_year_group() {
        let f = filters("year_from=2019&year_to=2020");
        let map = DepartmentMap::new();
        let q = SearchQuery::new("", &f, &map, "c");
        assert_eq!(
            q.filter_query(),
            "search.resourcetype:Item AND location.coll:c AND dateIssued.year:[2019 TO 2020]"
        );
    }

    #[test]
    fn department_filter_expands_to_mapped_codes() {
        let f = filters("department=Physics&department=Nowhere");
        let map = DepartmentMap::from_entries([("comm-1", "Physics"), ("coll-9", "Physics")]);
        let q = SearchQuery::new("", &f, &map, "c");
        assert!(q
            .filter_query()
            .ends_with("AND (location.comm:comm-1 OR location.comm:coll-9)"));

        let unknown = filters("department=Nowhere");
        let q = SearchQuery::new("", &unknown, &map, "c");
        assert_eq!(q.filter_query(), "search.resourcetype:Item AND location.coll:c");
    }

    #[test]
    fn empty_text_matches_everything() {
        let f = Filters::default();
        let map = DepartmentMap::new();
        let params = SearchQuery::new("  ", &f, &map, "c").page(PageWindow::default(), FacetScope::Page);
        assert_eq!(params.get("q"), Some("*:*"));
        assert_eq!(params.get("hl.fl"), Some("dc.title"));
        assert!(!params.contains("defType"));
        assert_eq!(params.get("facet.limit"), Some("20"));
        assert_eq!(params.get_all("facet.field").len(), FACET_FIELDS.len());
    }

    #[test]
    fn text_query_uses_edismax_with_boosts() {
        let f = Filters::default();
        let map = DepartmentMap::new();
        let params = SearchQuery::new("graphene", &f, &map, "c").page(PageWindow::new(2, 50), FacetScope::Api);
        assert_eq!(params.get("defType"), Some("edismax"));
        assert_eq!(params.get("qf"), Some(SEARCH_FIELDS));
        assert_eq!(params.get("mm"), Some("1"));
        assert_eq!(params.get("hl.q"), Some("graphene"));
        assert_eq!(params.get("start"), Some("50"));
        assert_eq!(params.get("rows"), Some("50"));
        assert_eq!(params.get("facet.limit"), Some("100"));
        assert_eq!(params.get("sort"), Some(PRIMARY_SORT));
        assert!(params.get("bq").unwrap_or_default().starts_with("dc.title:\"graphene\"^10"));
    }

    #[test]
    fn count_and_export_shapes() {
        let f = Filters::default();
        let map = DepartmentMap::new();
        let q = SearchQuery::new("x", &f, &map, "c");

        let count = q.count();
        assert_eq!(count.get("rows"), Some("0"));
        assert!(!count.contains("facet"));
        assert!(!count.contains("hl"));

        let export = q.export(&["id", "dc.title"], 1000, 500);
        assert_eq!(export.get("fl"), Some("id,dc.title"));
        assert_eq!(export.get("sort"), Some(EXPORT_SORT));
        assert_eq!(export.get("start"), Some("1000"));
        assert_eq!(export.get("fq"), count.get("fq"));

        let facets = q.facets();
        assert_eq!(facets.get("rows"), Some("0"));
        assert_eq!(facets.get("facet.limit"), Some("500"));
    }
}
