use crate::errors::reject;
use crate::utils::{json_body, with_engine};
use loto_core::{Combination, LotoEngine};
use serde::Deserialize;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub lottery_id: String,
    pub combination: Combination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBlockRequest {
    pub lottery_id: String,
    pub combinations: Vec<Combination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRequest {
    pub lottery_id: String,
    pub combinations: Vec<Combination>,
    pub star_index: Option<usize>,
}

pub async fn verify(engine: Arc<LotoEngine>, req: VerifyRequest) -> Result<impl Reply, Rejection> {
    let report = engine
        .verify(&req.lottery_id, &req.combination)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&report))
}

pub async fn verify_block(engine: Arc<LotoEngine>, req: VerifyBlockRequest) -> Result<impl Reply, Rejection> {
    let entries = engine
        .verify_block(&req.lottery_id, &req.combinations)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&entries))
}

pub async fn coverage(engine: Arc<LotoEngine>, req: CoverageRequest) -> Result<impl Reply, Rejection> {
    let summary = engine
        .coverage(&req.lottery_id, &req.combinations, req.star_index)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&summary))
}

pub fn routes(engine: Arc<LotoEngine>) -> warp::filters::BoxedFilter<(impl Reply,)> {
    let verify_route = {
        let engine = Arc::clone(&engine);
        warp::path!("verify")
            .and(warp::post())
            .and(json_body())
            .and(with_engine(engine))
            .and_then(|req: VerifyRequest, engine: Arc<LotoEngine>| async move {
                verify(engine, req).await
            })
            .boxed()
    };

    let block_route = {
        let engine = Arc::clone(&engine);
        warp::path!("verify-block")
            .and(warp::post())
            .and(json_body())
            .and(with_engine(engine))
            .and_then(|req: VerifyBlockRequest, engine: Arc<LotoEngine>| async move {
                verify_block(engine, req).await
            })
            .boxed()
    };

    let coverage_route = warp::path!("coverage")
        .and(warp::post())
        .and(json_body())
        .and(with_engine(engine))
        .and_then(|req: CoverageRequest, engine: Arc<LotoEngine>| async move {
            coverage(engine, req).await
        })
        .boxed();

    verify_route.or(block_route).or(coverage_route).boxed()
}
