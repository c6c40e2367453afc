use warp::{Filter, Rejection, Reply};

#[derive(Debug, serde::Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> Result<impl Reply, Rejection> {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Ok(warp::reply::json(&response))
}

pub fn routes() -> warp::filters::BoxedFilter<(impl Reply,)> {
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(|| async { health_check().await })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let resp = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&routes())
            .await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
