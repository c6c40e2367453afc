use crate::errors::reject;
use crate::utils::with_engine;
use loto_core::LotoEngine;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

pub async fn list_rules(engine: Arc<LotoEngine>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&engine.rules()))
}

pub async fn get_rule(engine: Arc<LotoEngine>, lottery_id: String) -> Result<impl Reply, Rejection> {
    let rule = engine.rule(&lottery_id).map_err(reject)?;
    Ok(warp::reply::json(rule))
}

pub fn routes(engine: Arc<LotoEngine>) -> warp::filters::BoxedFilter<(impl Reply,)> {
    let list_route = {
        let engine = Arc::clone(&engine);
        warp::path!("rules")
            .and(warp::get())
            .and(with_engine(engine))
            .and_then(|engine: Arc<LotoEngine>| async move { list_rules(engine).await })
            .boxed()
    };

    let get_route = warp::path!("rules" / String)
        .and(warp::get())
        .and(with_engine(engine))
        .and_then(|lottery_id: String, engine: Arc<LotoEngine>| async move {
            get_rule(engine, lottery_id).await
        })
        .boxed();

    list_route.or(get_route).boxed()
}
