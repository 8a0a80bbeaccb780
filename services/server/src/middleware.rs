//! Acting-user extraction and request correlation

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info_span};

use crate::error::ServerError;

/// Header carrying the id of the user performing the request
pub const SHARER_USER_HEADER: &str = "X-Sharer-User-Id";

/// Header correlating gateway and server log lines
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Id of the acting user, taken from `X-Sharer-User-Id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerUserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SharerUserId
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(SHARER_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(SharerUserId)
            .ok_or(ServerError::MissingUserHeader)
    }
}

/// Run the rest of the stack inside a span tagged with the caller's request id
pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let span = info_span!("request", request_id = %request_id);
    next.run(req).instrument(span).await
}
