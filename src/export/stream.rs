use crate::departments::DepartmentMap;
use crate::export::columns;
use crate::export::encode::{ExportFormat, RowEncoder};
use crate::export::record::ExportRecord;
use crate::export::ExportError;
use crate::search::filters::Filters;
use crate::search::query::SearchQuery;
use crate::solr::{SolrClient, SolrError, SolrResponse};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const CHANNEL_DEPTH: usize = 4;

pub type Chunk = Result<Vec<u8>, ExportError>;

/// What to export and how much of it.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub text: String,
    pub filters: Filters,
    pub format: ExportFormat,
    pub target_collection: String,
    /// Upper bound on emitted rows.
    pub limit: usize,
    /// Rows per upstream page.
    pub batch: usize,
}

impl ExportJob {
    fn query<'a>(&'a self, departments: &'a DepartmentMap) -> SearchQuery<'a> {
        SearchQuery::new(&self.text, &self.filters, departments, &self.target_collection)
    }

    async fn fetch(
        &self,
        client: &SolrClient,
        departments: &DepartmentMap,
        start: usize,
        rows: usize,
    ) -> Result<SolrResponse, SolrError> {
        let params = self.query(departments).export(&columns::field_list(), start, rows);
        client.select(&params).await
    }
}

/// An export in progress. The body arrives in chunks over a bounded channel;
/// dropping the receiver stops the producer before its next upstream page.
pub struct ExportStream {
    pub num_found: u64,
    rx: mpsc::Receiver<Chunk>,
}

impl ExportStream {
    pub async fn next_chunk(&mut self) -> Option<Chunk> {
        self.rx.recv().await
    }

    pub fn into_stream(self) -> ReceiverStream<Chunk> {
        ReceiverStream::new(self.rx)
    }
}

/// Fetches the first page up front, so an unreachable backend fails here
/// rather than mid-body, then streams the rest from a spawned task.
pub async fn start(client: SolrClient, departments: DepartmentMap, job: ExportJob) -> Result<ExportStream, SolrError> {
    let first_rows = job.batch.min(job.limit);
    let first = job.fetch(&client, &departments, 0, first_rows).await?;
    let num_found = first.response.num_found;
    let format = job.format;

    tracing::info!(
        num_found,
        limit = job.limit,
        format = format.extension(),
        "export started"
    );

    let (tx, rx) = mpsc::channel::<Chunk>(CHANNEL_DEPTH);
    tokio::spawn(produce(client, departments, job, first, tx));

    Ok(ExportStream { num_found, rx })
}

async fn produce(
    client: SolrClient,
    departments: DepartmentMap,
    job: ExportJob,
    first: SolrResponse,
    tx: mpsc::Sender<Chunk>,
) {
    let mut encoder = RowEncoder::new(job.format);
    let target = (first.response.num_found as usize).min(job.limit);
    let mut page = first;
    let mut fetched = 0usize;

    loop {
        let docs = &page.response.docs;
        let take = docs.len().min(target.saturating_sub(fetched));
        let records: Vec<ExportRecord> = docs[..take]
            .iter()
            .map(|doc| ExportRecord::from_document(doc, &departments))
            .collect();
        fetched += docs.len();

        match encoder.rows(&records) {
            Ok(bytes) if bytes.is_empty() => {}
            Ok(bytes) => {
                if tx.send(Ok(bytes)).await.is_err() {
                    tracing::info!(rows = encoder.rows_written(), "export client went away");
                    return;
                }
            }
            Err(err) => {
                tracing::warn!(%err, "export encoding failed");
                let _ = tx.send(Err(err)).await;
                return;
            }
        }

        if docs.is_empty() || fetched >= target {
            break;
        }
        if tx.is_closed() {
            tracing::info!(rows = encoder.rows_written(), "export cancelled");
            return;
        }

        let rows = job.batch.min(target - fetched);
        page = match job.fetch(&client, &departments, fetched, rows).await {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(%err, offset = fetched, "export page failed");
                let _ = tx.send(Err(ExportError::Solr(err))).await;
                return;
            }
        };
    }

    let tail = encoder.finish();
    if !tail.is_empty() {
        let _ = tx.send(Ok(tail)).await;
    }
    tracing::info!(rows = encoder.rows_written(), "export finished");
}
