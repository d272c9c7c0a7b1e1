mod client;
mod params;
mod response;

pub use client::{SolrClient, SolrError};
pub use params::SolrParams;
pub use response::{FacetCounts, FieldValue, ResultSet, SolrDocument, SolrResponse};
