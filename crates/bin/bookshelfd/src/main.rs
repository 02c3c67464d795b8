//! # bookshelfd: bookshelf daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the in-memory catalogue serving the JSON API
//! - Construct the HTTP repository client the pages wire into their registry
//! - Build the axum router and serve it until SIGINT
//!
//! ## Dependency rule
//! This is the wiring layer; no domain logic belongs here.

mod config;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bookshelf_adapter_http_axum::router;
use bookshelf_adapter_http_axum::state::AppState;
use bookshelf_adapter_memory::InMemoryCatalogue;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Stores
    let catalogue = InMemoryCatalogue::default();
    let pages = config
        .api_client()
        .build()
        .context("building book API client")?;

    let pages_url = pages.base_url().clone();

    // HTTP
    let state = AppState::new(catalogue, pages).with_page_timeout(config.page_timeout());
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, api = %pages_url, "bookshelfd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("bookshelfd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
