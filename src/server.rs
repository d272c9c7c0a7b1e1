use crate::config::Config;
use crate::search::SearchService;
use crate::solr::SolrClient;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Builds the Solr client and serves the portal until SIGINT/SIGTERM.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = SolrClient::new(&config.solr_url, Duration::from_secs(config.solr_timeout_secs))?;
    tracing::info!(solr = %client.endpoint(), "solr endpoint configured");

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let service = SearchService::new(client, Arc::new(config));
    let app = crate::api::router(service);

    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::warn!(%err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
