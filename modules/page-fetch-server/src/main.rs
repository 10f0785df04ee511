use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use page_fetch_server::{app, AppState, Config};
use page_fetcher::{HttpTransport, ReqwestTransport};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("page_fetch=info".parse()?))
        .init();

    let config = Config::from_env()?;
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::with_options(config.transport_options())?);

    info!(
        mappings = config.domain_mappings.len(),
        user_agent = %config.user_agent,
        "Page fetcher configured"
    );

    let state = Arc::new(AppState::new(&config, transport));
    let addr = config.bind_addr();
    info!("page-fetch starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
