//! Server-rendered search page.
//!
//! Handlers hand a [`PageModel`] to [`PageRenderer`], which flattens it into
//! a serializable view and renders the embedded minijinja templates. Plain
//! strings are auto-escaped by the template engine; the card fields that
//! already carry `<mark>` markup are sanitised upstream and marked `|safe`.

pub mod links;

use crate::search::query::{DEFAULT_PER_PAGE, PER_PAGE_OPTIONS};
use crate::search::results::{sentence_case, UNKNOWN_YEAR};
use crate::search::{Facets, FilterDimension, Filters, PageWindow, Publication};
use indexmap::IndexMap;
use links::{page_href, pagination_range};
use minijinja::Environment;
use rust_embed::RustEmbed;
use serde::Serialize;

const FACET_INITIAL: usize = 5;
const PAGE_TEMPLATE: &str = "page.html";

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

/// Data for a page whose main query succeeded.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub cards: Vec<Publication>,
    pub facets: Facets,
    pub total: u64,
    pub total_pages: usize,
    pub showing: (u64, u64),
}

#[derive(Debug, Clone)]
pub enum PageBody {
    Loaded(Loaded),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PageModel<'a> {
    pub query: &'a str,
    pub filters: &'a Filters,
    pub window: PageWindow,
    pub body: PageBody,
}

/// Template environment over the embedded `templates/` folder.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_loader(|name| {
            Ok(Templates::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned()))
        });
        Self { env }
    }

    pub fn render(&self, model: &PageModel<'_>) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(PAGE_TEMPLATE)?;
        template.render(PageView::build(model))
    }
}

#[derive(Serialize)]
struct PageView<'a> {
    query: &'a str,
    /// Filter state the search box resubmits.
    carried: Vec<(String, String)>,
    /// Non-default page size, kept by every form.
    per_page: Option<usize>,
    error: Option<&'a str>,
    results: Option<ResultsView<'a>>,
}

impl<'a> PageView<'a> {
    fn build(model: &'a PageModel<'a>) -> Self {
        let per_page = (model.window.per_page != DEFAULT_PER_PAGE).then_some(model.window.per_page);
        let (error, results) = match &model.body {
            PageBody::Loaded(loaded) => (None, Some(ResultsView::build(model, loaded))),
            PageBody::Failed(message) => (Some(message.as_str()), None),
        };
        Self {
            query: model.query,
            carried: model.filters.to_query_pairs(),
            per_page,
            error,
            results,
        }
    }
}

#[derive(Serialize)]
struct ResultsView<'a> {
    years: Option<YearView>,
    /// Range the user applied; the sidebar form resubmits it.
    year_range: Option<(i64, i64)>,
    groups: Vec<FacetGroup>,
    show_clear: bool,
    chips: Vec<Chip>,
    total: u64,
    showing: (u64, u64),
    no_results_for: Vec<String>,
    per_page_options: Vec<PerPageOption>,
    cards: Vec<CardView<'a>>,
    pagination: Option<PaginationView>,
    bootstrap: serde_json::Value,
}

impl<'a> ResultsView<'a> {
    fn build(model: &'a PageModel<'a>, loaded: &'a Loaded) -> Self {
        let filters = model.filters;
        let groups = [
            (FilterDimension::Type, "Publication Type", &loaded.facets.types),
            (FilterDimension::Department, "Department", &loaded.facets.departments),
            (FilterDimension::Author, "Author", &loaded.facets.authors),
            (FilterDimension::Source, "Source Title", &loaded.facets.sources),
            (FilterDimension::Country, "Country", &loaded.facets.countries),
            (FilterDimension::OpenAccess, "Open Access Type", &loaded.facets.openaccess),
            (FilterDimension::Language, "Language", &loaded.facets.languages),
        ]
        .into_iter()
        .map(|(dim, title, values)| FacetGroup::build(filters, dim, title, values))
        .collect();

        Self {
            years: YearView::build(filters, &loaded.facets.years),
            year_range: filters.year_range,
            groups,
            show_clear: !filters.is_empty() || !model.query.is_empty(),
            chips: Chip::all(model),
            total: loaded.total,
            showing: loaded.showing,
            no_results_for: no_results_for(model),
            per_page_options: PER_PAGE_OPTIONS
                .iter()
                .map(|&value| PerPageOption {
                    value,
                    href: page_href(model.query, filters, value, 1),
                    selected: value == model.window.per_page,
                })
                .collect(),
            cards: loaded.cards.iter().map(CardView::build).collect(),
            pagination: PaginationView::build(model, loaded.total_pages),
            bootstrap: serde_json::json!({
                "query": model.query,
                "filters": filters,
                "facets": loaded.facets.top(FACET_INITIAL),
            }),
        }
    }
}

#[derive(Serialize)]
struct YearView {
    bars: Vec<YearBar>,
    min: i64,
    max: i64,
    from: i64,
    to: i64,
    entries: Vec<YearItem>,
}

#[derive(Serialize)]
struct YearBar {
    year: i64,
    count: u64,
    height: u64,
}

#[derive(Serialize)]
struct YearItem {
    year: i64,
    count: u64,
    checked: bool,
}

impl YearView {
    fn build(filters: &Filters, years: &IndexMap<i64, u64>) -> Option<Self> {
        let min = years.keys().copied().min()?;
        let max = years.keys().copied().max()?;
        let tallest = years.values().copied().max().unwrap_or(1).max(1);
        let (from, to) = filters.year_range.unwrap_or((min, max));

        Some(Self {
            bars: years
                .iter()
                .rev()
                .map(|(&year, &count)| YearBar {
                    year,
                    count,
                    height: count * 100 / tallest,
                })
                .collect(),
            min,
            max,
            from,
            to,
            entries: years
                .iter()
                .map(|(&year, &count)| YearItem {
                    year,
                    count,
                    checked: filters.year_range.is_none() && filters.year.contains(&year.to_string()),
                })
                .collect(),
        })
    }
}

#[derive(Serialize)]
struct FacetGroup {
    name: &'static str,
    title: &'static str,
    empty_label: String,
    entries: Vec<FacetItem>,
    initial: usize,
    see_more: bool,
}

#[derive(Serialize)]
struct FacetItem {
    index: usize,
    value: String,
    display: String,
    count: u64,
    checked: bool,
    hidden: bool,
}

impl FacetGroup {
    fn build(filters: &Filters, dim: FilterDimension, title: &'static str, values: &IndexMap<String, u64>) -> Self {
        let selected = filters.values(dim);
        let entries = values
            .iter()
            .enumerate()
            .map(|(index, (value, &count))| {
                let value = value.trim();
                FacetItem {
                    index,
                    value: value.to_string(),
                    display: if dim == FilterDimension::OpenAccess {
                        sentence_case(value)
                    } else {
                        value.to_string()
                    },
                    count,
                    checked: selected.iter().any(|s| s.trim().eq_ignore_ascii_case(value)),
                    hidden: index >= FACET_INITIAL,
                }
            })
            .collect();
        Self {
            name: dim.param(),
            title,
            empty_label: title.to_lowercase(),
            entries,
            initial: FACET_INITIAL,
            see_more: values.len() > FACET_INITIAL,
        }
    }
}

/// One removable active-filter tag.
#[derive(Serialize)]
struct Chip {
    label: &'static str,
    value: String,
    href: String,
}

impl Chip {
    fn all(model: &PageModel<'_>) -> Vec<Self> {
        let filters = model.filters;
        let per_page = model.window.per_page;
        let mut chips = Vec::new();
        if let Some((from, to)) = filters.year_range {
            chips.push(Chip {
                label: FilterDimension::Year.label(),
                value: format!("{from} - {to}"),
                href: page_href(model.query, &filters.without_dimension(FilterDimension::Year), per_page, 1),
            });
        }
        for (dim, value) in filters.active() {
            if dim == FilterDimension::Year && filters.year_range.is_some() {
                continue;
            }
            chips.push(Chip {
                label: dim.label(),
                value: value.to_string(),
                href: page_href(model.query, &filters.without(dim, value), per_page, 1),
            });
        }
        chips
    }
}

fn no_results_for(model: &PageModel<'_>) -> Vec<String> {
    let mut parts = Vec::new();
    if !model.query.is_empty() {
        parts.push(format!("search: \"{}\"", model.query));
    }
    for dim in FilterDimension::ALL {
        let values = model.filters.values(dim);
        if !values.is_empty() {
            parts.push(format!("{}: {}", dim.param(), values.join(", ")));
        }
    }
    parts
}

#[derive(Serialize)]
struct PerPageOption {
    value: usize,
    href: String,
    selected: bool,
}

#[derive(Serialize)]
struct CardView<'a> {
    #[serde(flatten)]
    publication: &'a Publication,
    badge: Option<&'a str>,
    facts: Vec<(&'static str, &'a str)>,
}

impl<'a> CardView<'a> {
    fn build(publication: &'a Publication) -> Self {
        let mut facts = Vec::new();
        for (label, value) in [
            ("Volume", publication.volume.as_str()),
            ("Issue", publication.issue.as_str()),
            ("Year", publication.year.as_str()),
            ("Pages", publication.pages.as_str()),
        ] {
            if !value.is_empty() && !(label == "Year" && value == UNKNOWN_YEAR) {
                facts.push((label, value));
            }
        }
        Self {
            publication,
            badge: publication.type_list.first().map(String::as_str),
            facts,
        }
    }
}

#[derive(Serialize)]
struct PageLink {
    number: usize,
    href: String,
    active: bool,
}

#[derive(Serialize)]
struct PaginationView {
    current: usize,
    total_pages: usize,
    prev_href: String,
    next_href: String,
    first: Option<PageLink>,
    leading_gap: bool,
    pages: Vec<PageLink>,
    trailing_gap: bool,
    last: Option<PageLink>,
}

impl PaginationView {
    fn build(model: &PageModel<'_>, total_pages: usize) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }
        let current = model.window.page.clamp(1, total_pages);
        let link = |number: usize| PageLink {
            number,
            href: page_href(model.query, model.filters, model.window.per_page, number),
            active: number == current,
        };
        let (start, end) = pagination_range(current, total_pages);

        Some(Self {
            current,
            total_pages,
            prev_href: link(current.saturating_sub(1).max(1)).href,
            next_href: link((current + 1).min(total_pages)).href,
            first: (start > 1).then(|| link(1)),
            leading_gap: start > 2,
            pages: (start..=end).map(link).collect(),
            trailing_gap: end + 1 < total_pages,
            last: (end < total_pages).then(|| link(total_pages)),
        })
    }
}
