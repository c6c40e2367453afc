//! HTTP routes

pub mod draws;
pub mod generate;
pub mod health;
pub mod rules;
pub mod verify;

use crate::errors::handle_rejection;
use loto_core::LotoEngine;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Reply};

pub fn api(engine: Arc<LotoEngine>) -> warp::filters::BoxedFilter<(impl Reply,)> {
    health::routes()
        .or(rules::routes(Arc::clone(&engine)))
        .or(generate::routes(Arc::clone(&engine)))
        .or(verify::routes(Arc::clone(&engine)))
        .or(draws::routes(engine))
        .boxed()
}

/// Every route with rejections turned into `{kind, message}` replies.
pub fn app(engine: Arc<LotoEngine>) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    api(engine).recover(handle_rejection)
}

#[cfg(test)]
pub(crate) async fn test_engine(dir: &std::path::Path) -> Arc<LotoEngine> {
    Arc::new(
        LotoEngine::new(loto_core::EngineConfig::new(dir))
            .await
            .unwrap(),
    )
}
