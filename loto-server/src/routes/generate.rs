use crate::errors::reject;
use crate::utils::{json_body, with_engine};
use loto_core::{GenerateOptions, LotoEngine};
use serde::Deserialize;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub lottery_id: String,
    pub count: usize,
    pub avoid_history: Option<bool>,
    pub apply_criteria: Option<bool>,
    pub record: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBlocksRequest {
    pub lottery_id: String,
    pub blocks: usize,
    pub apply_criteria: Option<bool>,
    pub record: Option<bool>,
}

fn options(apply_criteria: Option<bool>, avoid_history: Option<bool>, record: Option<bool>) -> GenerateOptions {
    let defaults = GenerateOptions::default();
    GenerateOptions {
        avoid_history: avoid_history.unwrap_or(defaults.avoid_history),
        apply_criteria: apply_criteria.unwrap_or(defaults.apply_criteria),
        record: record.unwrap_or(defaults.record),
        ..defaults
    }
}

pub async fn generate(engine: Arc<LotoEngine>, req: GenerateRequest) -> Result<impl Reply, Rejection> {
    let options = options(req.apply_criteria, req.avoid_history, req.record);
    let batch = engine
        .generate(&req.lottery_id, req.count, options)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&batch))
}

pub async fn generate_blocks(
    engine: Arc<LotoEngine>,
    req: GenerateBlocksRequest,
) -> Result<impl Reply, Rejection> {
    let options = options(req.apply_criteria, None, req.record);
    let batch = engine
        .generate_blocks(&req.lottery_id, req.blocks, options)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&batch))
}

pub fn routes(engine: Arc<LotoEngine>) -> warp::filters::BoxedFilter<(impl Reply,)> {
    let generate_route = {
        let engine = Arc::clone(&engine);
        warp::path!("generate")
            .and(warp::post())
            .and(json_body())
            .and(with_engine(engine))
            .and_then(|req: GenerateRequest, engine: Arc<LotoEngine>| async move {
                generate(engine, req).await
            })
            .boxed()
    };

    let blocks_route = warp::path!("generate-blocks")
        .and(warp::post())
        .and(json_body())
        .and(with_engine(engine))
        .and_then(|req: GenerateBlocksRequest, engine: Arc<LotoEngine>| async move {
            generate_blocks(engine, req).await
        })
        .boxed();

    generate_route.or(blocks_route).boxed()
}

#[cfg(test)]
mod tests {
    use crate::routes::{app, test_engine};
    use serde_json::json;

    #[tokio::test]
    async fn test_generate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let app = app(test_engine(temp_dir.path()).await);

        let resp = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&json!({ "lotteryId": "649", "count": 4, "applyCriteria": true }))
            .reply(&app)
            .await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert!(body["batchId"].as_str().is_some());
        let combinations = body["combinations"].as_array().unwrap();
        assert_eq!(combinations.len(), 4);
        for c in combinations {
            assert_eq!(c["numbers"].as_array().unwrap().len(), 6);
        }
    }

    #[tokio::test]
    async fn test_generate_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let app = app(test_engine(temp_dir.path()).await);

        let resp = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&json!({ "lotteryId": "keno", "count": 1 }))
            .reply(&app)
            .await;
        assert_eq!(resp.status(), 404);

        let resp = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&json!({ "lotteryId": "649", "count": 0 }))
            .reply(&app)
            .await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["kind"], "InvalidRequest");

        let resp = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&json!({ "count": 1 }))
            .reply(&app)
            .await;
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_generate_blocks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let app = app(test_engine(temp_dir.path()).await);

        let resp = warp::test::request()
            .method("POST")
            .path("/generate-blocks")
            .json(&json!({ "lotteryId": "649", "blocks": 1 }))
            .reply(&app)
            .await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        let block = &body["blocks"][0];
        assert_eq!(block["index"], 1);
        assert_eq!(block["base"].as_array().unwrap().len(), 8);
        assert_eq!(block["star"]["numbers"].as_array().unwrap().len(), 6);
    }
}
