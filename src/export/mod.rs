pub mod columns;
pub mod encode;
pub mod record;
pub mod stream;

pub use encode::{encode_all, ExportFormat, RowEncoder};
pub use record::ExportRecord;
pub use stream::{start, ExportJob, ExportStream};

use crate::solr::SolrError;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Solr(#[from] SolrError),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
