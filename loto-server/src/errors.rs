use loto_core::{ErrorKind, ErrorPayload, LotoError};
use std::convert::Infallible;
use tracing::error;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Rejection, Reply};

/// Engine failure carried through warp's rejection chain.
#[derive(Debug)]
pub struct ApiError(pub LotoError);

impl Reject for ApiError {}

pub fn reject(err: LotoError) -> Rejection {
    warp::reject::custom(ApiError(err))
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidCombination | ErrorKind::DuplicateInBlock => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::GenerationExhausted | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Storage | ErrorKind::Config | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn payload(kind: ErrorKind, message: impl Into<String>) -> ErrorPayload {
    ErrorPayload {
        kind,
        message: message.into(),
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, body) = if let Some(ApiError(e)) = err.find::<ApiError>() {
        let code = status_for(e.kind());
        if code.is_server_error() {
            error!("Request failed: {}", e);
        }
        (code, e.to_payload())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, payload(ErrorKind::NotFound, "Not Found"))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            payload(ErrorKind::InvalidRequest, e.to_string()),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            payload(ErrorKind::InvalidRequest, "Payload too large"),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            payload(ErrorKind::InvalidRequest, "Method not allowed"),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            payload(ErrorKind::Internal, "Internal Server Error"),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::InvalidCombination),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(ErrorKind::GenerationExhausted),
            StatusCode::CONFLICT
        );
        assert_eq!(status_for(ErrorKind::InvalidRequest), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorKind::Storage),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_engine_error_reply() {
        let reply = handle_rejection(reject(LotoError::not_found("keno")))
            .await
            .unwrap()
            .into_response();
        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
    }
}
