//! HTTP service for the lottery engine

mod config;
mod errors;
mod routes;
mod utils;

use anyhow::Result;
use config::ServerConfig;
use loto_core::LotoEngine;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warp::Filter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("loto_core=info,loto_server=info,warp=info")),
        )
        .with(fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let engine = Arc::new(LotoEngine::new(config.engine.clone()).await?);
    let lotteries: Vec<&str> = engine.catalog().ids().collect();
    info!("Serving lotteries: {}", lotteries.join(", "));

    let app = routes::app(engine).with(warp::cors().allow_any_origin());

    let addr = config.addr();
    info!("Listening on http://{}", addr);
    warp::serve(app).run(addr).await;

    Ok(())
}
