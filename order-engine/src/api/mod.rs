//! HTTP surface
//!
//! Thin axum handlers over [`OrderService`](crate::orders::OrderService).
//! Authentication is upstream; the tenant arrives in `x-merchant-id`.

pub mod context;
pub mod health;
pub mod orders;

use axum::Router;
use http::{HeaderName, HeaderValue};
use shared::error::{ApiResponse, AppError};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Handler result: `ApiResponse` envelope on success, `AppError` otherwise
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, AppError>;

/// Wrap a payload in the success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(axum::Json(ApiResponse::success(data)))
}

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upper bound on requests handled at once
const MAX_IN_FLIGHT_REQUESTS: usize = 1024;

#[derive(Clone)]
struct SnowflakeRequestId;

impl MakeRequestId for SnowflakeRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = shared::util::snowflake_id().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(orders::router())
        .merge(health::router())
}

/// Fully configured application
pub fn router(state: ServerState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // Router layers wrap outward: the id is set before it is propagated
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            SnowflakeRequestId,
        ))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT_REQUESTS))
        .with_state(state)
}
