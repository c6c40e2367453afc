use loto_core::LotoEngine;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// Request bodies above this size are rejected.
pub const BODY_LIMIT: u64 = 256 * 1024;

pub fn with_engine(
    engine: Arc<LotoEngine>,
) -> impl Filter<Extract = (Arc<LotoEngine>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&engine))
}

pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(BODY_LIMIT).and(warp::body::json())
}
