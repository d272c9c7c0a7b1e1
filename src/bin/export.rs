use clap::{Parser, ValueEnum};
use scholar_portal::config::Config;
use scholar_portal::departments::DepartmentMap;
use scholar_portal::export::{self, ExportFormat, ExportJob};
use scholar_portal::search::{Filters, RequestParams};
use scholar_portal::solr::SolrClient;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Txt,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Csv => ExportFormat::Csv,
            Format::Txt => ExportFormat::Text,
            Format::Json => ExportFormat::Json,
        }
    }
}

/// Export matching publications straight from Solr, without the web portal.
#[derive(Debug, Parser)]
#[command(name = "scholar-export", version)]
struct Args {
    #[arg(long, value_enum, default_value = "csv")]
    format: Format,

    /// Free-text query.
    #[arg(long, short, default_value = "")]
    query: String,

    #[arg(long)]
    author: Vec<String>,

    #[arg(long = "type")]
    kind: Vec<String>,

    #[arg(long)]
    department: Vec<String>,

    #[arg(long)]
    year_from: Option<i64>,

    #[arg(long)]
    year_to: Option<i64>,

    /// Row limit; defaults to EXPORT_DEFAULT_ROWS, capped at EXPORT_MAX_ROWS.
    #[arg(long)]
    rows: Option<usize>,

    /// Output file. Writes to stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Args {
    fn filters(&self) -> Filters {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        pairs.extend(self.author.iter().map(|v| ("author", v.clone())));
        pairs.extend(self.kind.iter().map(|v| ("type", v.clone())));
        pairs.extend(self.department.iter().map(|v| ("department", v.clone())));
        if let Some(from) = self.year_from {
            pairs.push(("year_from", from.to_string()));
        }
        if let Some(to) = self.year_to {
            pairs.push(("year_to", to.to_string()));
        }
        let params = RequestParams::from_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        Filters::from_params(&params)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let client = SolrClient::new(&config.solr_url, Duration::from_secs(config.solr_timeout_secs))?;
    let departments = DepartmentMap::load(&client, &config).await;

    let job = ExportJob {
        text: args.query.trim().to_string(),
        filters: args.filters(),
        format: args.format.into(),
        target_collection: config.target_collection_id.clone(),
        limit: config.export_row_limit(args.rows),
        batch: config.export_batch_rows,
    };

    let mut stream = export::start(client, departments, job).await?;
    eprintln!("{} matching records", stream.num_found);

    let mut out: Box<dyn AsyncWrite + Unpin + Send> = match &args.output {
        Some(path) => Box::new(tokio::fs::File::create(path).await?),
        None => Box::new(tokio::io::stdout()),
    };

    let mut bytes = 0usize;
    while let Some(chunk) = stream.next_chunk().await {
        let chunk = chunk?;
        bytes += chunk.len();
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    if let Some(path) = &args.output {
        eprintln!("wrote {bytes} bytes to {}", path.display());
    }
    Ok(())
}
