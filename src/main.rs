//! Product catalog server.
//!
//! Run with:
//!   API_KEY=secret RUST_LOG=info cargo run
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl -H 'x-api-key: secret' 'http://localhost:3000/api/products?category=electronics'
//!   curl -H 'x-api-key: secret' -X POST http://localhost:3000/api/products \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"Kettle","description":"1.7l","price":30,"category":"kitchen"}'

use std::sync::Arc;

use anyhow::Context;
use catalog::{Catalog, Config, Server, routes};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let catalog = if config.seed_catalog { Catalog::seeded() } else { Catalog::new() };
    info!(products = catalog.len(), "catalog ready");

    let app = routes::app(Arc::new(catalog), &config.api_key);

    Server::bind(config.socket_addr())
        .serve(app)
        .await
        .context("server error")?;

    Ok(())
}
