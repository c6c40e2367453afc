use crate::errors::reject;
use crate::utils::{json_body, with_engine};
use chrono::NaiveDate;
use loto_core::{Combination, LotoEngine};
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDrawRequest {
    pub lottery_id: String,
    pub combination: Combination,
    pub sequence: Option<u64>,
    pub drawn_on: Option<NaiveDate>,
}

pub async fn list_draws(engine: Arc<LotoEngine>, lottery_id: String) -> Result<impl Reply, Rejection> {
    let history = engine.history(&lottery_id).await.map_err(reject)?;
    Ok(warp::reply::json(&history.draws()))
}

pub async fn record_draw(engine: Arc<LotoEngine>, req: RecordDrawRequest) -> Result<impl Reply, Rejection> {
    let draw = engine
        .record_draw(&req.lottery_id, req.combination, req.sequence, req.drawn_on)
        .await
        .map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&draw),
        StatusCode::CREATED,
    ))
}

pub fn routes(engine: Arc<LotoEngine>) -> warp::filters::BoxedFilter<(impl Reply,)> {
    let list_route = {
        let engine = Arc::clone(&engine);
        warp::path!("draws" / String)
            .and(warp::get())
            .and(with_engine(engine))
            .and_then(|lottery_id: String, engine: Arc<LotoEngine>| async move {
                list_draws(engine, lottery_id).await
            })
            .boxed()
    };

    let record_route = warp::path!("draws")
        .and(warp::post())
        .and(json_body())
        .and(with_engine(engine))
        .and_then(|req: RecordDrawRequest, engine: Arc<LotoEngine>| async move {
            record_draw(engine, req).await
        })
        .boxed();

    list_route.or(record_route).boxed()
}
