mod api;
mod bookmarklet;
mod config;
mod pages;
mod routing;
mod sdk;
mod server;

use crate::config::AppConfig;
use crate::pages::FsPageStore;
use crate::server::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = AppConfig::load()?;
    let pages: Arc<dyn crate::pages::PageStore> =
        Arc::new(FsPageStore::new(config.page_root.clone()));
    let state = AppState::new(config.clone(), pages);

    let addr: SocketAddr = config.bind_addr;
    tracing::info!(%addr, canonical_host = ?config.canonical_host, "starting tinderizer-web server");
    server::run(addr, state).await?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
