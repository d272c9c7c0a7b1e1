pub mod authors;
pub mod facets;
pub mod filters;
pub mod highlight;
pub mod query;
pub mod results;
pub mod service;
pub mod sort;

pub use facets::Facets;
pub use filters::{FilterDimension, Filters, RequestParams};
pub use query::{FacetScope, PageWindow, SearchQuery, PER_PAGE_OPTIONS};
pub use results::{ApiPublication, Publication};
pub use service::{SearchOutcome, SearchRequest, SearchService};
