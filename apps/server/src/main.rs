#![deny(warnings)]

//! HTTP surface for the scenario, outcome and insights generation calls.

mod error;
mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use life_ai::HttpGenerator;
use life_runtime::LifeSimConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn parse_args() -> Option<PathBuf> {
    let mut config: Option<PathBuf> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        if arg == "--config" {
            config = it.next().map(PathBuf::from);
        }
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = LifeSimConfig::load(parse_args().as_deref()).context("loading configuration")?;
    let generator =
        HttpGenerator::new(cfg.generator.clone()).context("set GEMINI_API_KEY to run the server")?;
    let addr: SocketAddr = cfg
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cfg.bind))?;

    let app = routes::router(routes::AppState::new(Arc::new(generator)));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, model = %cfg.generator.model, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
